use crate::config::ConnectionSettings;
use crate::db;
use crate::queries;
use crate::report::NeighborhoodReport;
use clap::{Arg, ArgMatches, Command, value_parser};

pub fn cli() -> Command {
    Command::new("restodactyl")
        .about("Restaurants of the sample_restaurants dataset, attributed to neighborhoods")
        .subcommand(Command::new("serve").about("Run the HTTP API (default)"))
        .subcommand(Command::new("report").about("Print the neighborhood attribution report"))
        .subcommand(
            Command::new("locate")
                .about("Print the neighborhood containing a point")
                .arg(
                    Arg::new("lon")
                        .long("lon")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("lat")
                        .long("lat")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("cuisine")
                .about("List restaurants of one cuisine, sorted by name")
                .arg(
                    Arg::new("cuisine")
                        .help("Cuisine to match exactly")
                        .default_value("American"),
                ),
        )
        .subcommand(
            Command::new("schema")
                .about("Infer a form schema from sampled restaurant documents")
                .arg(
                    Arg::new("sample")
                        .long("sample")
                        .value_name("N")
                        .value_parser(value_parser!(i64).range(1..))
                        .default_value("100"),
                ),
        )
        .subcommand(Command::new("databases").about("List databases and their collections"))
        .subcommand(Command::new("version").about("Print the MongoDB server version"))
}

pub fn render_report(report: &NeighborhoodReport) -> String {
    let mut out = String::new();

    for (neighborhood, restaurants) in &report.neighborhoods {
        out.push_str(neighborhood);
        out.push('\n');
        for restaurant in restaurants {
            out.push_str(&format!("\t{} ({})\n", restaurant.name, restaurant.cuisine));
        }
    }

    out.push_str(&format!(
        "{} restaurants in {} neighborhoods; skipped {} malformed neighborhoods, {} malformed coordinates, {} unattributed\n",
        report.attributed,
        report.neighborhoods.len(),
        report.skipped.malformed_neighborhoods,
        report.skipped.malformed_coordinates,
        report.skipped.unattributed,
    ));

    out
}

/// Runs a one-shot subcommand. `serve` is handled by `main`.
pub async fn handle_cli(
    subcommand: (&str, &ArgMatches),
    settings: &ConnectionSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = db::connect(settings).await?;

    match subcommand {
        ("report", _) => {
            let report = queries::neighborhood_report(&client, settings).await?;
            print!("{}", render_report(&report));
        }
        ("locate", sub_matches) => {
            let lon = *sub_matches.get_one::<f64>("lon").ok_or("missing --lon")?;
            let lat = *sub_matches.get_one::<f64>("lat").ok_or("missing --lat")?;

            match queries::locate_point(&client, settings, lon, lat).await? {
                Some(neighborhood) => println!("{neighborhood}"),
                None => {
                    eprintln!("No neighborhood contains ({lon}, {lat})");
                    std::process::exit(1);
                }
            }
        }
        ("cuisine", sub_matches) => {
            let cuisine = sub_matches
                .get_one::<String>("cuisine")
                .map(String::as_str)
                .unwrap_or("American");

            for listing in queries::restaurants_by_cuisine(&client, settings, cuisine).await? {
                println!("{}", listing.name);
                println!("\tcuisine: {}", listing.cuisine);
                println!("\tborough: {}", listing.borough.as_deref().unwrap_or("-"));
                println!("\tzipcode: {}", listing.zipcode.as_deref().unwrap_or("-"));
            }
        }
        ("schema", sub_matches) => {
            let sample = sub_matches.get_one::<i64>("sample").copied().unwrap_or(100);
            let schema = queries::restaurant_schema(&client, settings, sample).await?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        ("databases", _) => {
            for database in queries::databases(&client, settings).await? {
                println!("{}", database.name);
                for collection in database.collections {
                    println!("\t{collection}");
                }
            }
        }
        ("version", _) => {
            println!("MongoDB {}", queries::server_version(&client, settings).await?);
        }
        _ => {
            cli().print_help()?;
        }
    }

    Ok(())
}
