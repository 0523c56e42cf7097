use std::collections::{BTreeMap, HashMap};

use crate::model::{FieldKind, FormData, Movie};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieField {
    Title,
    Language,
}

const NAME_ALIASES: &[&str] = &[
    "Name",
    "name",
    "CustomerName",
    "customer_name",
    "FullName",
    "full_name",
];
const STREET_ALIASES: &[&str] = &[
    "Street",
    "street",
    "Address",
    "address",
    "StreetAddress",
    "street_address",
];
const POSTAL_CITY_ALIASES: &[&str] = &[
    "PostalCodeCity",
    "postal_code_city",
    "PostalCode",
    "postal_code",
    "City",
    "city",
    "ZipCity",
    "zip_city",
    "Zip",
    "zip",
];
const COUNTRY_ALIASES: &[&str] = &["Country", "country", "Nation", "nation"];
const MOVIE_TITLE_ALIASES: &[&str] = &[
    "MovieTitle",
    "movie_title",
    "Title",
    "title",
    "MovieName",
    "movie_name",
];
const MOVIE_LANGUAGE_ALIASES: &[&str] = &[
    "MovieLanguage",
    "movie_language",
    "Language",
    "language",
    "Lang",
    "lang",
];

pub fn scalar_aliases(kind: FieldKind) -> &'static [&'static str] {
    match kind {
        FieldKind::Name => NAME_ALIASES,
        FieldKind::Street => STREET_ALIASES,
        FieldKind::PostalCity => POSTAL_CITY_ALIASES,
        FieldKind::Country => COUNTRY_ALIASES,
    }
}

impl MovieField {
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Title => MOVIE_TITLE_ALIASES,
            Self::Language => MOVIE_LANGUAGE_ALIASES,
        }
    }

    pub fn indexed_aliases(self, index: usize) -> [String; 4] {
        match self {
            Self::Title => [
                format!("MovieTitle{index}"),
                format!("movie_title_{index}"),
                format!("Title{index}"),
                format!("title_{index}"),
            ],
            Self::Language => [
                format!("MovieLanguage{index}"),
                format!("movie_language_{index}"),
                format!("Language{index}"),
                format!("language_{index}"),
            ],
        }
    }

    pub fn value(self, movie: &Movie) -> &str {
        match self {
            Self::Title => &movie.title,
            Self::Language => &movie.language,
        }
    }

    fn accepts(self, name: &str, index: usize) -> bool {
        self.aliases().contains(&name) || self.indexed_aliases(index).iter().any(|alias| alias == name)
    }
}

fn scalar_value<'a>(name: &str, data: &'a FormData) -> Option<&'a str> {
    FieldKind::ALL
        .into_iter()
        .find(|kind| scalar_aliases(*kind).contains(&name))
        .and_then(|kind| kind.value(data))
}

pub fn merge_values(data: &FormData, declared: &[String]) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();

    for field in declared {
        if let Some(value) = scalar_value(field, data) {
            values.insert(field.clone(), value.to_string());
        }
    }

    for (offset, movie) in data.movies.iter().enumerate() {
        let index = offset + 1;
        for field in declared {
            for movie_field in [MovieField::Title, MovieField::Language] {
                let value = movie_field.value(movie);
                if !value.is_empty() && movie_field.accepts(field, index) {
                    values.insert(field.clone(), value.to_string());
                    break;
                }
            }
        }
    }

    values
}

#[derive(Debug, Clone, Default)]
pub struct ControlValues {
    values: HashMap<&'static str, String>,
}

impl ControlValues {
    pub fn from_form_data(data: &FormData) -> Self {
        let mut values = HashMap::new();

        for kind in FieldKind::ALL {
            if let Some(value) = kind.value(data) {
                for alias in scalar_aliases(kind) {
                    values.insert(*alias, value.to_string());
                }
            }
        }

        if let Some(movie) = data.movies.first() {
            for movie_field in [MovieField::Title, MovieField::Language] {
                let value = movie_field.value(movie);
                if value.is_empty() {
                    continue;
                }
                for alias in movie_field.aliases() {
                    values.insert(*alias, value.to_string());
                }
            }
        }

        Self { values }
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.values.get(identifier).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FormData {
        FormData {
            name: Some("Jane Doe".to_string()),
            street: Some(String::new()),
            postal_code_city: Some("90210 LA".to_string()),
            country: None,
            movies: vec![
                Movie::new("Dune", "English"),
                Movie::new("Amélie", "French"),
            ],
        }
    }

    fn declared(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn merge_values_only_cover_declared_and_filled_fields() {
        let values = merge_values(
            &sample(),
            &declared(&["FullName", "Street", "Zip", "Country", "Unrelated"]),
        );
        assert_eq!(values.len(), 2);
        assert_eq!(values["FullName"], "Jane Doe");
        assert_eq!(values["Zip"], "90210 LA");
    }

    #[test]
    fn indexed_and_unindexed_movie_aliases_are_both_written() {
        let values = merge_values(
            &sample(),
            &declared(&["MovieTitle1", "language_2", "Title", "Lang", "Title3"]),
        );
        assert_eq!(values["MovieTitle1"], "Dune");
        assert_eq!(values["language_2"], "French");
        assert_eq!(values["Title"], "Amélie");
        assert_eq!(values["Lang"], "French");
        assert!(!values.contains_key("Title3"));
    }

    #[test]
    fn control_values_use_only_the_first_movie() {
        let values = ControlValues::from_form_data(&sample());
        assert_eq!(values.get("customer_name"), Some("Jane Doe"));
        assert_eq!(values.get("PostalCode"), Some("90210 LA"));
        assert_eq!(values.get("street"), None);
        assert_eq!(values.get("country"), None);
        assert_eq!(values.get("MovieTitle"), Some("Dune"));
        assert_eq!(values.get("lang"), Some("English"));
        assert_eq!(values.get("MovieTitle2"), None);
    }

    #[test]
    fn empty_form_yields_no_control_values() {
        assert!(ControlValues::from_form_data(&FormData::default()).is_empty());
    }
}
