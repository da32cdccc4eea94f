pub mod scrape_service;
