//! Implementation of the `docval rules` command.

use super::CommandContext;
use super::output::print_json;
use crate::cli::{OutputFormat, RulesArgs};
use crate::document::DocumentType;
use crate::error::Result;
use crate::rules::{RuleCatalog, RuleDefinition};
use serde_json::{Map, Value};

/// Execute the `docval rules` command.
///
/// Lists the effective rules (built-in rules adjusted by config) for one
/// document type, or for every type when none is given.
pub fn cmd_rules(ctx: &CommandContext, args: RulesArgs) -> Result<()> {
    let catalog = RuleCatalog::from_config(&ctx.config.rules)?;
    let sections = select_sections(&catalog, args.document_type.as_deref())?;

    match ctx.format {
        OutputFormat::Text => {
            print!("{}", format_sections(&sections));
            Ok(())
        }
        OutputFormat::Json => {
            let mut map = Map::new();
            for (doc_type, rules) in &sections {
                map.insert(
                    doc_type.tag().to_string(),
                    Value::Array(rules.iter().map(RuleDefinition::to_json).collect()),
                );
            }
            print_json(&Value::Object(map))
        }
    }
}

fn select_sections<'c>(
    catalog: &'c RuleCatalog,
    name: Option<&str>,
) -> Result<Vec<(DocumentType, &'c [RuleDefinition])>> {
    match name {
        Some(name) => {
            let doc_type: DocumentType = name.parse()?;
            Ok(vec![(doc_type, catalog.rules_for(doc_type)?)])
        }
        None => catalog
            .document_types()
            .map(|doc_type| Ok((doc_type, catalog.rules_for(doc_type)?)))
            .collect(),
    }
}

fn format_sections(sections: &[(DocumentType, &[RuleDefinition])]) -> String {
    let mut out = String::new();

    for (index, (doc_type, rules)) in sections.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{} ({} rules)\n", doc_type, rules.len()));
        for rule in *rules {
            out.push_str(&format!(
                "  {:<9} {:<6} {:<16} {}\n",
                rule.id, rule.severity, rule.category, rule.description
            ));
            out.push_str(&format!("            check: {}\n", rule.check.summary()));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::DocvalError;

    #[test]
    fn single_type_by_loose_name() {
        let catalog = RuleCatalog::standard(&Config::default().rules);
        let sections = select_sections(&catalog, Some("tax record")).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, DocumentType::TaxRecord);
        assert_eq!(sections[0].1[0].id, "GEN-001");
    }

    #[test]
    fn all_types_when_unnamed() {
        let catalog = RuleCatalog::standard(&Config::default().rules);
        let sections = select_sections(&catalog, None).unwrap();
        let types: Vec<DocumentType> = sections.iter().map(|(t, _)| *t).collect();
        assert_eq!(types, DocumentType::ALL.to_vec());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let catalog = RuleCatalog::standard(&Config::default().rules);
        let err = select_sections(&catalog, Some("Passport")).unwrap_err();
        assert!(matches!(err, DocvalError::InvalidDocumentType(_)));
    }

    #[test]
    fn text_lists_ids_and_checks() {
        let catalog = RuleCatalog::standard(&Config::default().rules);
        let sections = select_sections(&catalog, Some("PPSN")).unwrap();
        let text = format_sections(&sections);
        assert!(text.starts_with("Personal Public Service Number ("));
        assert!(text.contains("PPSN-001"));
        assert!(text.contains("check: "));
    }
}
