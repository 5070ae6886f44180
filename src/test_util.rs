//! Assertion helpers shared by the unit tests.

/// Run a winnow parser over `input` and compare its output with `expect`.
#[allow(unused)]
pub fn generic_command_parse<'a, F, T, E>(mut parser: F, input: &'a str, expect: T)
where
    F: FnMut(&mut &'a str) -> Result<T, E>,
    T: PartialEq + std::fmt::Debug,
    E: std::fmt::Debug,
{
    let mut input = input;
    let result = parser(&mut input);
    assert!(result.is_ok(), "The result:\r\n{:#?}", result);
    let res = result.unwrap();
    assert_eq!(
        expect, res,
        "The expect:\r\n({:?}) should be same with the result:\r\n({:?})",
        expect, res
    );
}

#[allow(unused)]
pub fn generic_parse<F, I, T>(parser: F, input: I, expect: T)
where
    F: Fn(I) -> T,
    T: PartialEq + std::fmt::Debug,
    I: std::fmt::Debug,
{
    let result = parser(input);
    assert_eq!(
        expect, result,
        "The expect:\r\n({:?}) should be same with the result:\r\n({:?})",
        expect, result
    );
}
