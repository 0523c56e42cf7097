use tracing::{debug, warn};

use super::{FillContext, FillStep};
use crate::docx::{
    W_TC, WordDocument, XmlElement, cell_text, new_table_row, row_grid_cells, set_cell_text,
    table_rows, truncate_to_header_row,
};
use crate::model::Movie;

pub struct MovieTableSynthesizer;

impl FillStep for MovieTableSynthesizer {
    fn name(&self) -> &'static str {
        "movie_table"
    }

    fn apply(&self, document: &mut WordDocument, context: &FillContext<'_>) -> bool {
        let Some(index) = context.structure.movie_table_index else {
            return false;
        };
        let Some(table) = document.table_mut(index) else {
            warn!(index, "inspected movie table is not in the document; skipping");
            return false;
        };
        let Some(columns) = MovieColumns::locate(table) else {
            debug!(index, "movie table header lacks title or language column");
            return false;
        };

        truncate_to_header_row(table);
        for movie in &context.data.movies {
            let row = columns.row_for(table, movie);
            table.push(row);
        }
        debug!(index, rows = context.data.movies.len(), "movie table rebuilt");
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MovieColumns {
    title: usize,
    language: usize,
}

impl MovieColumns {
    fn locate(table: &XmlElement) -> Option<Self> {
        let header = table_rows(table).next()?;
        let mut title = None;
        let mut name = None;
        let mut language = None;

        for (idx, cell) in row_grid_cells(header) {
            let text = cell_text(cell).trim().to_lowercase();
            if text.contains("title") {
                title = Some(idx);
            } else if text.contains("name") && title.is_none() {
                name = Some(idx);
            } else if text.contains("language") || text.contains("lang") {
                language = Some(idx);
            }
        }

        Some(Self {
            title: title.or(name)?,
            language: language?,
        })
    }

    fn row_for(self, table: &XmlElement, movie: &Movie) -> XmlElement {
        let mut row = new_table_row(table);
        for (idx, cell) in row.children_named_mut(W_TC).enumerate() {
            if idx == self.title {
                set_cell_text(cell, &movie.title);
            } else if idx == self.language {
                set_cell_text(cell, &movie.language);
            }
        }
        row
    }
}
