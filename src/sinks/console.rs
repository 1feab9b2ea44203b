//! Console sink implementation

use crate::core::{Result, Sink};
use colored::Colorize;

/// Prints each row to stdout as `[table] column=value ...`
pub struct ConsoleSink {
    use_colors: bool,
    show_schema: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            show_schema: true,
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Print the schema line when a table is initialized
    #[must_use]
    pub fn with_schema(mut self, show_schema: bool) -> Self {
        self.show_schema = show_schema;
        self
    }

    fn format_row(&self, table: &str, row: &[String], columns: &[String]) -> String {
        let label = if self.use_colors {
            format!("[{}]", table).green().bold().to_string()
        } else {
            format!("[{}]", table)
        };

        let fields: Vec<String> = columns
            .iter()
            .zip(row)
            .map(|(column, value)| {
                if self.use_colors {
                    format!("{}={}", column.dimmed(), value)
                } else {
                    format!("{}={}", column, value)
                }
            })
            .collect();

        format!("{} {}", label, fields.join(" "))
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn init(&mut self, table: &str, columns: &[String], type_names: &[String]) -> Result<()> {
        if self.show_schema {
            let schema: Vec<String> = columns
                .iter()
                .zip(type_names)
                .map(|(column, type_name)| format!("{}:{}", column, type_name))
                .collect();
            println!("[{}] schema {}", table, schema.join(", "));
        }
        Ok(())
    }

    fn update(&mut self, table: &str, row: &[String], columns: &[String]) -> Result<()> {
        println!("{}", self.format_row(table, row, columns));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
