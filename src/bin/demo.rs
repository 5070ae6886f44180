use curlkit::{CurlParser, to_curl};

fn main() {
    let curl_command = "curl 'http://example.com/api/items?page=2' -H 'Accept: application/json' -d '{\"name\":\"demo\"}'";
    let mut parser = CurlParser::new();
    match parser.parse(curl_command) {
        Some(request) => {
            println!("{:#?}", request);
            println!("{}", to_curl(&request));
        }
        None => eprintln!("Could not parse: {}", curl_command),
    }
}
