/// Raw program text as read from the board: rows of cells, any of which may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Grid {
        Grid { rows }
    }

    pub fn from_rows<R, C, S>(rows: R) -> Grid
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Grid {
            rows: rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// One row per line; cells are separated by tabs, or by commas when the
    /// line has no tab. Lines starting with `#` stay as empty rows so row
    /// numbers keep matching line numbers.
    pub fn from_text(text: &str) -> Grid {
        let rows = text.lines()
            .map(|line| {
                if line.trim_start().starts_with('#') {
                    vec![]
                } else if line.contains('\t') {
                    line.split('\t').map(str::to_owned).collect()
                } else {
                    line.split(',').map(str::to_owned).collect()
                }
            })
            .collect();

        Grid { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// `(rows, columns)`, where columns is the widest row.
    pub fn shape(&self) -> (usize, usize) {
        let cols = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        (self.rows.len(), cols)
    }

    pub fn is_rectangular(&self) -> bool {
        let (_, cols) = self.shape();
        self.rows.iter().all(|row| row.len() == cols)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(|cell| cell.trim().is_empty())
    }
}

impl From<Vec<Vec<String>>> for Grid {
    fn from(rows: Vec<Vec<String>>) -> Grid {
        Grid::new(rows)
    }
}
