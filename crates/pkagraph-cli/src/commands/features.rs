use crate::cli::{FeaturesArgs, KindFilter};
use crate::error::Result;
use pkagraph::core::features::{DEFAULT_EDGE_FEATURES, DEFAULT_NODE_FEATURES, Vocabulary};
use pkagraph::workflows::error::WorkflowError;
use std::fmt::Write;
use tracing::info;

pub fn run(args: FeaturesArgs) -> Result<()> {
    let vocabulary = Vocabulary::standard();
    print!("{}", render(&vocabulary, &args)?);
    Ok(())
}

fn render(vocabulary: &Vocabulary, args: &FeaturesArgs) -> Result<String> {
    let mut out = String::new();

    if !args.width.is_empty() {
        let width = vocabulary
            .feature_width(args.width.as_slice())
            .map_err(WorkflowError::from)?;
        info!(features = args.width.len(), width, "Computed selection width.");
        let _ = writeln!(out, "{width}");
        return Ok(out);
    }

    if args.kind != Some(KindFilter::Edge) {
        let names = vocabulary.node_names();
        let _ = writeln!(out, "Node features ({}):", names.len());
        for name in names {
            if let Some(entry) = vocabulary.node_entry(name) {
                let _ = writeln!(out, "  {:<26} {:>3}  {}", name, entry.width(), entry.domain());
            }
        }
        let default_width = vocabulary
            .feature_width(DEFAULT_NODE_FEATURES)
            .map_err(WorkflowError::from)?;
        let _ = writeln!(out, "  Default selection width: {default_width}");
    }

    if args.kind != Some(KindFilter::Node) {
        let names = vocabulary.edge_names();
        let _ = writeln!(out, "Edge features ({}):", names.len());
        for name in names {
            if let Some(entry) = vocabulary.edge_entry(name) {
                let _ = writeln!(out, "  {:<26} {:>3}  {}", name, entry.width(), entry.domain());
            }
        }
        let default_width = vocabulary
            .feature_width(DEFAULT_EDGE_FEATURES)
            .map_err(WorkflowError::from)?;
        let _ = writeln!(out, "  Default selection width: {default_width}");
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    fn args(kind: Option<KindFilter>, width: &[&str]) -> FeaturesArgs {
        FeaturesArgs {
            kind,
            width: width.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn listing_covers_both_kinds() {
        let text = render(&Vocabulary::standard(), &args(None, &[])).unwrap();
        assert!(text.contains("Node features"));
        assert!(text.contains("Edge features"));
        assert!(text.contains("element"));
        assert!(text.contains("bond_type"));
        assert!(text.contains("Default selection width: 39"));
        assert!(text.contains("Default selection width: 6"));
    }

    #[test]
    fn kind_filter_limits_the_listing() {
        let text = render(&Vocabulary::standard(), &args(Some(KindFilter::Edge), &[])).unwrap();
        assert!(!text.contains("Node features"));
        assert!(text.contains("is_conjugated"));
    }

    #[test]
    fn width_of_a_selection_is_printed() {
        let text = render(
            &Vocabulary::standard(),
            &args(None, &["element", "formal_charge"]),
        )
        .unwrap();
        assert_eq!(text.trim(), "13");

        let err = render(&Vocabulary::standard(), &args(None, &["element", "bond_type"]));
        assert!(matches!(err, Err(CliError::Core(WorkflowError::Features(_)))));
    }
}
