use std::process::ExitCode;

use psurl::{SuffixList, UrlError, UrlValue};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: psurl [--clear-cache] [--load] <url>...";

fn describe(raw: &str) -> Result<(), UrlError> {
    let url = UrlValue::parse(raw)?;

    println!("{}", url);
    println!("  scheme:    {}", url.scheme());
    println!("  host:      {}", url.host().unwrap_or(""));
    if let Some(port) = url.port() {
        println!("  port:      {}", port);
    }
    println!("  path:      {}", url.path());
    if url.host_is_ip() {
        println!("  ip host");
    } else {
        match (url.subdomain(), url.domain(), url.tld()) {
            (Ok(subdomain), Ok(domain), Ok(tld)) => {
                println!("  subdomain: {}", subdomain.unwrap_or(""));
                println!("  domain:    {}", domain.unwrap_or("?"));
                println!("  tld:       {}", tld.unwrap_or("?"));
            }
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => println!("  host components: {}", e),
        }
    }
    for (key, value) in url.query_string_data().iter() {
        println!("  query {:?} = {:?}", key, value);
    }
    if let Some(fragment) = url.hash_fragment() {
        println!("  fragment:  {}", fragment);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut urls = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--clear-cache" => {
                if let Err(e) = UrlValue::clear_suffix_list_cache() {
                    eprintln!("✗ Could not clear cache: {}", e);
                    return ExitCode::FAILURE;
                }
                println!("✓ Suffix list cache cleared");
            }
            "--load" => match SuffixList::global().load() {
                Ok(outcome) => println!("✓ Suffix list loaded: {:?}", outcome),
                Err(e) => {
                    eprintln!("✗ Could not load suffix list: {}", e);
                    return ExitCode::FAILURE;
                }
            },
            "-h" | "--help" => {
                println!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            _ => urls.push(arg),
        }
    }

    let mut failed = false;
    for raw in &urls {
        if let Err(e) = describe(raw) {
            eprintln!("✗ {}: {}", raw, e);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
