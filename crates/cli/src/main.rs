//! Bulk discount CLI - run discounts without the embedded admin.
//!
//! # Usage
//!
//! ```bash
//! # Discount everything except bundles by 20%
//! bd-cli apply --discount 20 --all-except-bundles
//!
//! # Reset products that carry any of the given tags
//! bd-cli reset --tags "Summer, Sale"
//!
//! # Discount all products except those tagged with every given tag
//! bd-cli apply --discount 10 --except-tags "Clearance, Final" --match-all
//! ```
//!
//! # Commands
//!
//! - `apply` - Apply a percentage discount
//! - `reset` - Reset prices to the compare-at baseline

#![cfg_attr(not(test), forbid(unsafe_code))]

use bulk_discount_core::{MutationResult, Selection, SelectionError, TagFilter, TagMatch};
use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bd-cli")]
#[command(author, version, about = "Bulk discount CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a percentage discount to the selected products
    Apply {
        /// Percentage off, 0-100
        #[arg(short, long)]
        discount: f64,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Reset the selected products to their compare-at prices
    Reset {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

/// Which products a run touches.
#[derive(Args)]
struct SelectionArgs {
    #[command(flatten)]
    selector: Selector,

    /// Require every tag instead of any (with --tags or --except-tags)
    #[arg(long)]
    match_all: bool,
}

/// Exactly one selector is required.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Selector {
    /// Every product not tagged "Bundle"
    #[arg(long)]
    all_except_bundles: bool,

    /// Only products tagged "Bundle"
    #[arg(long)]
    bundles: bool,

    /// Products NOT matching these comma-separated tags
    #[arg(long, value_name = "TAGS")]
    except_tags: Option<String>,

    /// Products matching these comma-separated tags
    #[arg(long, value_name = "TAGS")]
    tags: Option<String>,

    /// Products titled exactly this
    #[arg(long, value_name = "TITLE")]
    product: Option<String>,
}

impl SelectionArgs {
    fn into_selection(self) -> Result<Selection, SelectionError> {
        let mode = TagMatch::from_match_all(self.match_all);
        let selector = self.selector;
        if selector.all_except_bundles {
            Ok(Selection::AllExceptBundles)
        } else if selector.bundles {
            Ok(Selection::Bundles)
        } else if let Some(tags) = selector.except_tags {
            Ok(Selection::ExcludeTags(TagFilter::parse(&tags, mode)?))
        } else if let Some(tags) = selector.tags {
            Ok(Selection::IncludeTags(TagFilter::parse(&tags, mode)?))
        } else {
            Selection::exact_title(selector.product.as_deref().unwrap_or_default())
        }
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(result) => report(&result),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<MutationResult, commands::discount::DiscountCommandError> {
    match cli.command {
        Commands::Apply {
            discount,
            selection,
        } => commands::discount::apply(discount, selection.into_selection()?).await,
        Commands::Reset { selection } => {
            commands::discount::reset(selection.into_selection()?).await
        }
    }
}

#[allow(clippy::print_stdout)]
fn report(result: &MutationResult) {
    println!("{}", result.message);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn selection(args: &[&str]) -> Result<Selection, SelectionError> {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Apply { selection, .. } | Commands::Reset { selection } => {
                selection.into_selection()
            }
        }
    }

    #[test]
    fn test_apply_all_except_bundles() {
        let cli = Cli::try_parse_from(["bd-cli", "apply", "--discount", "20", "--all-except-bundles"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Apply { discount, .. } if (discount - 20.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_tag_selection_with_match_all() {
        let selected = selection(&["bd-cli", "reset", "--tags", "A, B", "--match-all"]).unwrap();
        let Selection::IncludeTags(filter) = selected else {
            panic!("expected tag selection");
        };
        assert_eq!(filter.mode(), TagMatch::All);
    }

    #[test]
    fn test_except_tags_defaults_to_any() {
        let selected = selection(&["bd-cli", "reset", "--except-tags", "A"]).unwrap();
        assert!(matches!(selected, Selection::ExcludeTags(f) if f.mode() == TagMatch::Any));
    }

    #[test]
    fn test_product_title_is_trimmed() {
        let selected = selection(&["bd-cli", "reset", "--product", " Blue Shirt "]).unwrap();
        assert_eq!(selected, Selection::ExactTitle("Blue Shirt".to_string()));
    }

    #[test]
    fn test_empty_tags_rejected() {
        assert_eq!(
            selection(&["bd-cli", "reset", "--tags", " , "]),
            Err(SelectionError::NoTags)
        );
    }

    #[test]
    fn test_selector_required_and_exclusive() {
        assert!(Cli::try_parse_from(["bd-cli", "reset"]).is_err());
        assert!(Cli::try_parse_from(["bd-cli", "reset", "--bundles", "--tags", "A"]).is_err());
    }
}
