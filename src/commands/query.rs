use anyhow::Result;
use log::{error, warn};
use std::io::{self, BufWriter, Write};

use preprint_matching::batch::{collect_input_files, load_items, parse_item};
use preprint_matching::common::setup_logging;
use preprint_matching::matching::QueryBuilder;

use crate::cli::QueryArgs;

/// Prints `input_doi<TAB>query` for every record; records without a query get an empty column
pub fn run_query(args: QueryArgs) -> Result<()> {
    setup_logging(&args.log_level, args.log_file.as_deref())?;

    let builder = QueryBuilder::new(args.max_query_len);
    let files = collect_input_files(&args.input)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for path in &files {
        let items = match load_items(path) {
            Ok(items) => items,
            Err(e) => {
                error!("{:#}", e);
                continue;
            }
        };

        for (index, item) in items.iter().enumerate() {
            let (doi, query) = match parse_item(item) {
                Ok(article) => {
                    let query = builder.build(&article).unwrap_or_else(|e| {
                        warn!("{} item {} ({}): {}", path.display(), index + 1, article.label(), e);
                        String::new()
                    });
                    (article.doi.unwrap_or_default(), query)
                }
                Err(e) => {
                    warn!("{} item {}: {}", path.display(), index + 1, e);
                    (String::new(), String::new())
                }
            };
            writeln!(out, "{}\t{}", doi, query)?;
        }
    }

    out.flush()?;
    Ok(())
}
