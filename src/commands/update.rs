use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::UpdateArgs;
use crate::model::{FormData, FormUpdate, Movie};
use crate::util::{read_json, write_json_pretty};

pub fn run(args: UpdateArgs) -> Result<()> {
    let mut data: FormData = if args.data.exists() {
        read_json(&args.data)?
    } else {
        info!(path = %args.data.display(), "starting a new order");
        FormData::default()
    };

    let movies = args
        .movies
        .iter()
        .map(|spec| parse_movie(spec))
        .collect::<Result<Vec<_>>>()?;

    let mut report = data.apply(FormUpdate {
        name: args.name,
        street: args.street,
        postal_code_city: args.postal_code_city,
        country: args.country,
        movies: Vec::new(),
    });
    for movie in &movies {
        let added = data.add_movie(&movie.title, &movie.language);
        info!(total = added.total_movies, "{}", added.message);
        report = data.report();
    }

    write_json_pretty(&args.data, &data)?;
    info!(
        path = %args.data.display(),
        complete = report.is_complete,
        "{}",
        report.message
    );

    let json = serde_json::to_string_pretty(&report).context("failed to serialize update report")?;
    println!("{json}");

    Ok(())
}

fn parse_movie(spec: &str) -> Result<Movie> {
    let Some((title, language)) = spec.rsplit_once('=') else {
        bail!("movie must be given as Title=Language: {spec}");
    };
    let movie = Movie::new(title, language);
    if movie.title.is_empty() || movie.language.is_empty() {
        bail!("movie title and language must not be empty: {spec}");
    }
    Ok(movie)
}
