//! Pre-trained embedding file loading
//!
//! Two layouts are read:
//! - one file, one `token v1 v2 ... vn` entry per line, optionally preceded
//!   by a header line with at most two fields (e.g. `400000 50`)
//! - an embedding file holding only vectors plus a vocabulary file with one
//!   token per line, aligned line by line
//!
//! Fields are whitespace separated. A token that appears twice keeps its
//! first vector.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array2;

use super::vocab::Vocabulary;
use crate::error::{Error, Result};

/// Load a vocabulary and its index-aligned embedding matrix
pub fn load_embeddings(
    embed_file: impl AsRef<Path>,
    vocab_file: Option<&Path>,
) -> Result<(Vocabulary, Array2<f32>)> {
    let embed_file = embed_file.as_ref();
    let mut table = Table::new(embed_file);
    match vocab_file {
        Some(vocab_file) => {
            let vectors = read_lines(embed_file)?;
            let tokens = read_lines(vocab_file)?;
            for (index, (vector, token)) in vectors.iter().zip(&tokens).enumerate() {
                let fields: Vec<&str> = vector.split_whitespace().collect();
                table.push(index + 1, token.trim(), &fields)?;
            }
        }
        None => {
            let lines = read_lines(embed_file)?;
            let skip = match lines.first() {
                Some(first) if first.split_whitespace().count() <= 2 => 1,
                _ => 0,
            };
            for (index, line) in lines.iter().enumerate().skip(skip) {
                let mut fields = line.split_whitespace();
                let Some(token) = fields.next() else {
                    continue;
                };
                let fields: Vec<&str> = fields.collect();
                table.push(index + 1, token, &fields)?;
            }
        }
    }
    table.finish()
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::io(format!("opening {}", path.display()), e))?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(format!("reading {}", path.display()), e))
}

/// Rows accumulated while reading
struct Table<'a> {
    path: &'a Path,
    vocabulary: Vocabulary,
    values: Vec<f32>,
    dim: Option<usize>,
}

impl<'a> Table<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, vocabulary: Vocabulary::new(), values: Vec::new(), dim: None }
    }

    fn error(&self, line: usize, message: impl Into<String>) -> Error {
        Error::EmbeddingFormat { path: self.path.to_path_buf(), line, message: message.into() }
    }

    fn push(&mut self, line: usize, token: &str, fields: &[&str]) -> Result<()> {
        if token.is_empty() || self.vocabulary.contains_token(token) {
            return Ok(());
        }
        if fields.is_empty() {
            return Err(self.error(line, format!("no vector for '{token}'")));
        }
        match self.dim {
            Some(dim) if dim != fields.len() => {
                return Err(self.error(
                    line,
                    format!("expected {dim} values for '{token}', found {}", fields.len()),
                ));
            }
            Some(_) => {}
            None => self.dim = Some(fields.len()),
        }
        let start = self.values.len();
        for field in fields {
            match field.parse::<f32>() {
                Ok(value) => self.values.push(value),
                Err(_) => {
                    self.values.truncate(start);
                    return Err(self.error(line, format!("'{field}' is not a number")));
                }
            }
        }
        self.vocabulary.add(token)?;
        Ok(())
    }

    fn finish(self) -> Result<(Vocabulary, Array2<f32>)> {
        let Some(dim) = self.dim else {
            return Err(self.error(0, "no embeddings found"));
        };
        let rows = self.vocabulary.len();
        let embeddings = Array2::from_shape_vec((rows, dim), self.values)
            .map_err(|e| Error::EmbeddingFormat {
                path: self.path.to_path_buf(),
                line: 0,
                message: e.to_string(),
            })?;
        Ok((self.vocabulary, embeddings))
    }
}
