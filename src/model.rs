use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub language: String,
}

impl Movie {
    pub fn new(title: &str, language: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            language: language.trim().to_string(),
        }
    }
}

/// Values collected for one order. Scalars stay `None` until provided, so an
/// explicit empty string remains distinguishable from "never asked".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub name: Option<String>,
    pub street: Option<String>,
    pub postal_code_city: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, Default)]
pub struct FormUpdate {
    pub name: Option<String>,
    pub street: Option<String>,
    pub postal_code_city: Option<String>,
    pub country: Option<String>,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub is_complete: bool,
    pub current_data: FormData,
    pub missing_fields: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieAddedReport {
    pub movie_added: Movie,
    pub total_movies: usize,
    pub movies: Vec<Movie>,
    pub message: String,
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.is_empty())
}

impl FormData {
    pub fn is_complete(&self) -> bool {
        is_filled(&self.name)
            && is_filled(&self.street)
            && is_filled(&self.postal_code_city)
            && is_filled(&self.country)
            && !self.movies.is_empty()
    }

    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if !is_filled(&self.name) {
            missing.push("Name");
        }
        if !is_filled(&self.street) {
            missing.push("Street");
        }
        if !is_filled(&self.postal_code_city) {
            missing.push("Postal Code and City");
        }
        if !is_filled(&self.country) {
            missing.push("Country");
        }
        if self.movies.is_empty() {
            missing.push("Movies");
        }
        missing.into_iter().map(ToOwned::to_owned).collect()
    }

    pub fn apply(&mut self, update: FormUpdate) -> UpdateReport {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(street) = update.street {
            self.street = Some(street);
        }
        if let Some(postal_code_city) = update.postal_code_city {
            self.postal_code_city = Some(postal_code_city);
        }
        if let Some(country) = update.country {
            self.country = Some(country);
        }
        self.movies.extend(update.movies);
        self.report()
    }

    pub fn add_movie(&mut self, title: &str, language: &str) -> MovieAddedReport {
        let movie = Movie::new(title, language);
        self.movies.push(movie.clone());
        let total = self.movies.len();
        MovieAddedReport {
            message: format!(
                "Added '{}' ({}). Total: {} movie(s).",
                movie.title, movie.language, total
            ),
            movie_added: movie,
            total_movies: total,
            movies: self.movies.clone(),
        }
    }

    pub fn report(&self) -> UpdateReport {
        let missing_fields = self.missing_fields();
        let is_complete = self.is_complete();
        let message = if is_complete {
            "Form is complete!".to_string()
        } else {
            format!("Still need: {}", missing_fields.join(", "))
        };
        UpdateReport {
            is_complete,
            current_data: self.clone(),
            missing_fields,
            message,
        }
    }

    pub fn movie_titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|movie| movie.title.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Name,
    Street,
    PostalCity,
    Country,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Name,
        FieldKind::Street,
        FieldKind::PostalCity,
        FieldKind::Country,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Street => "Street/Address",
            Self::PostalCity => "Postal Code/City",
            Self::Country => "Country",
        }
    }

    pub fn value(self, data: &FormData) -> Option<&str> {
        let value = match self {
            Self::Name => &data.name,
            Self::Street => &data.street,
            Self::PostalCity => &data.postal_code_city,
            Self::Country => &data.country,
        };
        value.as_deref().filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedField {
    pub kind: FieldKind,
    pub label: String,
    pub paragraph: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStructure {
    pub detected_fields: Vec<DetectedField>,
    pub movie_table_index: Option<usize>,
    pub available_movies: Vec<String>,
}

impl FormStructure {
    pub fn has_field(&self, kind: FieldKind) -> bool {
        self.detected_fields.iter().any(|field| field.kind == kind)
    }

    pub fn has_movie_table(&self) -> bool {
        self.movie_table_index.is_some()
    }

    pub fn has_checkbox_list(&self) -> bool {
        !self.available_movies.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub success: bool,
    pub detected_fields: Vec<String>,
    pub has_movie_table: bool,
    pub movie_table_index: Option<usize>,
    pub has_checkbox_list: bool,
    pub available_movies: Vec<String>,
    pub message: String,
    pub document_sha256: String,
    pub inspected_at: String,
}

const LISTED_OPTIONS: usize = 10;

impl InspectionReport {
    pub fn new(structure: &FormStructure, document_sha256: String, inspected_at: String) -> Self {
        let detected_fields: Vec<String> = FieldKind::ALL
            .into_iter()
            .filter(|kind| structure.has_field(*kind))
            .map(|kind| kind.display_name().to_string())
            .collect();

        let mut movie_info = Vec::new();
        if structure.has_movie_table() {
            movie_info.push("a movie table for adding custom movies".to_string());
        }
        if structure.has_checkbox_list() {
            let listed: Vec<&str> = structure
                .available_movies
                .iter()
                .take(LISTED_OPTIONS)
                .map(String::as_str)
                .collect();
            movie_info.push(format!(
                "a checkbox list with {} movie options: {}",
                structure.available_movies.len(),
                listed.join(", ")
            ));
        }
        let movie_message = if movie_info.is_empty() {
            "no movie section".to_string()
        } else {
            movie_info.join(" and ")
        };

        Self {
            success: true,
            message: format!(
                "Found {} address fields and {}.",
                detected_fields.len(),
                movie_message
            ),
            detected_fields,
            has_movie_table: structure.has_movie_table(),
            movie_table_index: structure.movie_table_index,
            has_checkbox_list: structure.has_checkbox_list(),
            available_movies: structure.available_movies.clone(),
            document_sha256,
            inspected_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FillReport {
    pub input_path: String,
    pub output_path: String,
    pub strategy: String,
    pub steps: Vec<StepReport>,
    pub output_sha256: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub changed: bool,
}
