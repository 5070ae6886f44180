use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use curlkit::curl::Curl;
use curlkit::curl::curl_parsers::curl_cmd_parse;
use curlkit::url::protocol::Scheme;
use curlkit::{ApiRequest, CurlParser, Environment, ParserConfig, to_curl, try_import_swagger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CurlPart {
    Method,
    Header,
    Data,
    Form,
    Flag,
    Url,
}

impl CurlPart {
    fn matches(&self, curl: &Curl) -> bool {
        matches!(
            (self, curl),
            (CurlPart::Method, Curl::Method(_))
                | (CurlPart::Header, Curl::Header(_))
                | (CurlPart::Data, Curl::Data(_))
                | (CurlPart::Form, Curl::Form(_))
                | (CurlPart::Flag, Curl::Flag(_))
                | (CurlPart::Url, Curl::Url(_))
        )
    }
}

fn cli() -> Command {
    Command::new("curlkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A CLI tool to parse, render and import API requests")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging (RUST_LOG takes precedence)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Parses a curl command or a bare url")
                .arg(
                    Arg::new("command")
                        .help("The input curl command string")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("part")
                        .short('p')
                        .long("part")
                        .value_name("PART")
                        .help("Only print one kind of argument (method, header, data, form, flag, url)")
                        .required(false)
                        .value_parser(clap::value_parser!(CurlPart)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the assembled request as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("scheme")
                        .long("scheme")
                        .value_name("SCHEME")
                        .help("Scheme for urls written without one (with --json)")
                        .value_parser(clap::value_parser!(Scheme)),
                )
                .arg(
                    Arg::new("raw-body")
                        .long("raw-body")
                        .help("Keep JSON bodies as written (with --json)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-tests")
                        .long("no-tests")
                        .help("Do not attach the default status test (with --json)")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("to-curl")
                .about("Renders a request JSON file (or stdin) as a curl command")
                .arg(Arg::new("file").help("Request JSON file").index(1)),
        )
        .subcommand(
            Command::new("import-swagger")
                .about("Imports a Swagger/OpenAPI JSON document as a collection")
                .arg(
                    Arg::new("file")
                        .help("Swagger/OpenAPI JSON file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("apply-env")
                .about("Substitutes {{key}} environment variables into a request")
                .arg(
                    Arg::new("request")
                        .help("Request JSON file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("environment")
                        .help("Environment JSON file")
                        .required(true)
                        .index(2),
                ),
        )
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&String>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
        }
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn cmd_parse(matches: &ArgMatches) -> Result<()> {
    let command = matches
        .get_one::<String>("command")
        .context("Missing curl command")?;

    if matches.get_flag("json") {
        let mut config = ParserConfig::default();
        if let Some(scheme) = matches.get_one::<Scheme>("scheme") {
            config.set_default_scheme(*scheme);
        }
        config
            .set_pretty_body(!matches.get_flag("raw-body"))
            .set_add_default_tests(!matches.get_flag("no-tests"));

        let mut parser = CurlParser::with_config(config);
        let request = parser
            .parse(command)
            .context("Could not parse the curl command")?;
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let curls = curl_cmd_parse(command).context("Error parsing curl command")?;
    let part = matches.get_one::<CurlPart>("part");
    for curl in curls.iter().filter(|c| part.is_none_or(|p| p.matches(c))) {
        println!("{:?}", curl);
    }
    Ok(())
}

fn cmd_to_curl(matches: &ArgMatches) -> Result<()> {
    let input = read_input(matches.get_one::<String>("file"))?;
    let request: ApiRequest =
        serde_json::from_str(&input).context("Input is not a valid request JSON")?;
    debug!(method = %request.method, url = %request.url, "rendering request");
    println!("{}", to_curl(&request));
    Ok(())
}

fn cmd_import_swagger(matches: &ArgMatches) -> Result<()> {
    let input = read_input(matches.get_one::<String>("file"))?;
    let collection = try_import_swagger(&input).context("Failed to import specification")?;
    info!(
        collection = %collection.name,
        requests = collection.requests.len(),
        "imported collection"
    );
    println!("{}", serde_json::to_string_pretty(&collection)?);
    Ok(())
}

fn cmd_apply_env(matches: &ArgMatches) -> Result<()> {
    let request = read_input(matches.get_one::<String>("request"))?;
    let environment = read_input(matches.get_one::<String>("environment"))?;
    let request: ApiRequest =
        serde_json::from_str(&request).context("Request is not a valid request JSON")?;
    let environment: Environment = serde_json::from_str(&environment)
        .context("Environment is not a valid environment JSON")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&environment.apply(&request))?
    );
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("parse", sub_matches)) => cmd_parse(sub_matches),
        Some(("to-curl", sub_matches)) => cmd_to_curl(sub_matches),
        Some(("import-swagger", sub_matches)) => cmd_import_swagger(sub_matches),
        Some(("apply-env", sub_matches)) => cmd_apply_env(sub_matches),
        _ => {
            cli().print_help()?;
            println!();
            Ok(())
        }
    }
}
