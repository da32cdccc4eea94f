use lse_scraper::config::Config;
use lse_scraper::scrapers::chrome::ChromeDriver;
use lse_scraper::services::scrape_service::ScrapeService;
use lse_scraper::table;
use lse_scraper::util;

use clap::{App, Arg};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = App::new("lse_scraper")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scrape current prices from the London Stock Exchange website")
        .arg(
            Arg::with_name("input")
                .long("input")
                .value_name("PATH")
                .help("Input CSV/XLSX file with company name and stock code columns")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .value_name("PATH")
                .help("Output file (.csv or .json)")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timestamp")
                .long("timestamp")
                .help("Append the run timestamp to the output file name")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("headed")
                .long("headed")
                .help("Show the browser window instead of running headless")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Seconds to wait for page content to appear")
                .takes_value(true)
                .default_value("10"),
        )
        .arg(
            Arg::with_name("chrome")
                .long("chrome")
                .value_name("PATH")
                .help("Chrome/Chromium executable to launch")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("remote-browser")
                .long("remote-browser")
                .value_name("URL")
                .help("DevTools endpoint of a running browser, e.g. http://localhost:9222")
                .takes_value(true),
        )
        .get_matches();

    let input = PathBuf::from(matches.value_of("input").unwrap_or_default());
    let mut output = PathBuf::from(matches.value_of("output").unwrap_or_default());
    if matches.is_present("timestamp") {
        output = util::timestamped_path(&output, &chrono::Local::now().naive_local());
    }

    let timeout_secs = matches
        .value_of("timeout")
        .unwrap_or("10")
        .parse::<u64>()
        .map_err(|e| format!("Invalid --timeout: {}", e))?;

    // 创建配置
    let mut config = Config::new()
        .with_headless(!matches.is_present("headed"))
        .with_page_timeout(Duration::from_secs(timeout_secs));
    if let Some(chrome) = matches.value_of("chrome") {
        config = config.with_chrome_executable(PathBuf::from(chrome));
    }
    if let Some(remote) = matches.value_of("remote-browser") {
        config = config.with_remote_url(remote);
    }

    // 先校验输入，再启动浏览器
    let requests = table::read_requests(&input)?;
    info!("Loaded {} stock requests from {}", requests.len(), input.display());

    let driver = ChromeDriver::start(&config).await?;
    let service = ScrapeService::new(config, driver)?;
    let responses = service.scrape(&requests).await?;

    table::write_responses(&output, &responses)?;

    Ok(())
}
