use clap::{Arg, ArgMatches, Command};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io;

use storefront_client::catalog::{FilterState, SortKey};
use storefront_client::config::ClientOptions;
use storefront_client::csv_io::{bulk_create, export_products, import_products};
use storefront_client::error::Error;
use storefront_client::Storefront;

fn cli() -> Command<'static> {
    Command::new("storefront")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Browse the catalog and move products in and out as CSV")
        .arg(
            Arg::new("api_url")
                .long("api-url")
                .value_name("URL")
                .takes_value(true)
                .help("API base URL (defaults to $API_URL)"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("export")
                .about("Write every product as CSV")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .takes_value(true)
                        .help("Output file (defaults to stdout)"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Create products from a CSV file")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .takes_value(true)
                        .required(true)
                        .help("CSV file to read"),
                )
                .arg(Arg::new("email").long("email").takes_value(true).help("Admin email"))
                .arg(Arg::new("password").long("password").takes_value(true).help("Admin password"))
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .help("Parse and validate only, send nothing"),
                ),
        )
        .subcommand(
            Command::new("browse")
                .about("List products the way the shop page does")
                .arg(Arg::new("search").short('s').long("search").takes_value(true))
                .arg(
                    Arg::new("category")
                        .short('c')
                        .long("category")
                        .takes_value(true)
                        .help("Comma separated category names"),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .takes_value(true)
                        .possible_values(["name", "price-low", "price-high", "rating", "newest", "discount"]),
                )
                .arg(Arg::new("in_stock").long("in-stock"))
                .arg(Arg::new("has_discount").long("has-discount"))
                .arg(
                    Arg::new("pages")
                        .short('p')
                        .long("pages")
                        .takes_value(true)
                        .default_value("1")
                        .help("Number of pages to show"),
                ),
        )
}

async fn export(shop: &Storefront, args: &ArgMatches) -> Result<(), Error> {
    let products = shop.products().list().await?;
    match args.value_of("output") {
        Some(path) => export_products(&products, File::create(path)?)?,
        None => export_products(&products, io::stdout().lock())?,
    }
    eprintln!("Exported {} products", products.len());
    Ok(())
}

async fn import(shop: &Storefront, args: &ArgMatches) -> Result<(), Error> {
    let path = args
        .value_of("input")
        .ok_or_else(|| Error::general("--input is required"))?;
    let report = import_products(File::open(path)?)?;
    for row in &report.errors {
        eprintln!("line {}: {}", row.line, row.message);
    }
    eprintln!("{} valid rows, {} rejected", report.products.len(), report.errors.len());

    if args.is_present("dry_run") || report.products.is_empty() {
        return Ok(());
    }

    if let (Some(email), Some(password)) = (args.value_of("email"), args.value_of("password")) {
        shop.auth().login(email, password).await?;
    } else if !shop.state().is_logged_in() {
        warn!("not signed in, the API may refuse the import");
    }

    let batch = bulk_create(&shop.products(), report.products).await;
    for failure in &batch.failed {
        eprintln!("row {} ({}): {}", failure.index + 1, failure.name, failure.message);
    }
    eprintln!("Created {} products, {} failed", batch.success_count(), batch.failed.len());
    Ok(())
}

async fn browse(shop: &Storefront, args: &ArgMatches) -> Result<(), Error> {
    let fetched = shop.products().list_with_fallback(Vec::new()).await;
    if fetched.is_degraded() {
        eprintln!("The catalog is unavailable right now.");
        return Ok(());
    }

    let mut params = HashMap::new();
    for (arg, key) in [("search", "search"), ("category", "category")] {
        if let Some(value) = args.value_of(arg) {
            params.insert(key.to_string(), value.to_string());
        }
    }
    for (arg, key) in [("in_stock", "inStock"), ("has_discount", "hasDiscount")] {
        if args.is_present(arg) {
            params.insert(key.to_string(), "true".to_string());
        }
    }

    let mut listing = shop.listing(fetched.items);
    listing.set_filter(FilterState::from_params(&params));
    listing.set_sort(args.value_of("sort").map(SortKey::parse).unwrap_or_default());

    let pages: usize = args
        .value_of("pages")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    for _ in 1..pages {
        if !listing.load_more() {
            break;
        }
    }

    for product in listing.visible() {
        println!(
            "{:<24} {:>10} {:<16} {}",
            product.id,
            product.final_price().round_dp(2),
            product.category,
            product.name
        );
    }
    eprintln!(
        "Showing {} of {} matching products{}",
        listing.visible().len(),
        listing.matched().len(),
        if listing.has_more() { " (more available)" } else { "" }
    );
    Ok(())
}

async fn run(matches: ArgMatches) -> Result<(), Error> {
    let mut options = ClientOptions::from_env();
    if let Some(url) = matches.value_of("api_url") {
        options = options.with_base_url(url);
    }
    debug!("using API at {}", options.base_url);
    let shop = Storefront::new_with_options(options)?;

    match matches.subcommand() {
        Some(("export", args)) => export(&shop, args).await,
        Some(("import", args)) => import(&shop, args).await,
        Some(("browse", args)) => browse(&shop, args).await,
        _ => Err(Error::general("unknown command")),
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(e) = run(cli().get_matches()).await {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
