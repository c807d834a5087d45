//! Sample behavior catalog
//!
//! Every scenario is written once against [`FrontEnd`] and runs on each
//! dialect whose capabilities cover it.

use crate::recipes::{add_import, change_package, order_imports, remove_unused_imports};
use tck_backend::{well_known, CapabilitySet, ConstructKind, FrontEnd, SourceUnit};
use tck_scenario::assert::{expect_eq, rewrite_run, SourceSpec};
use tck_scenario::{CatalogError, ScenarioCatalog, ScenarioResult};

/// `AddImport`
pub const ADD_IMPORT: &str = "AddImport";
/// `OrderImports`
pub const ORDER_IMPORTS: &str = "OrderImports";
/// `RemoveUnusedImports`
pub const REMOVE_UNUSED_IMPORTS: &str = "RemoveUnusedImports";
/// `ChangePackage`
pub const CHANGE_PACKAGE: &str = "ChangePackage";
/// `LocalVariableInference`
pub const LOCAL_VARIABLE_INFERENCE: &str = "LocalVariableInference";
/// `TextBlockRoundTrip`
pub const TEXT_BLOCK_ROUND_TRIP: &str = "TextBlockRoundTrip";
/// `RecordDeclaration`
pub const RECORD_DECLARATION: &str = "RecordDeclaration";
/// `PatternMatchingSwitch`
pub const PATTERN_MATCHING_SWITCH: &str = "PatternMatchingSwitch";

/// Build the sample catalog
///
/// # Errors
/// Returns `CatalogError` if two scenarios share a name.
pub fn catalog() -> Result<ScenarioCatalog, CatalogError> {
    let mut catalog = ScenarioCatalog::new();
    catalog
        .register(ADD_IMPORT, CapabilitySet::new(), add_import_scenario)?
        .register(ORDER_IMPORTS, CapabilitySet::new(), order_imports_scenario)?
        .register(REMOVE_UNUSED_IMPORTS, CapabilitySet::new(), remove_unused_imports_scenario)?
        .register(CHANGE_PACKAGE, CapabilitySet::new(), change_package_scenario)?
        .register(
            LOCAL_VARIABLE_INFERENCE,
            CapabilitySet::new().with(well_known::VAR_INFERENCE),
            local_variable_inference_scenario,
        )?
        .register(
            TEXT_BLOCK_ROUND_TRIP,
            CapabilitySet::new().with(well_known::TEXT_BLOCKS),
            text_block_scenario,
        )?
        .register(
            RECORD_DECLARATION,
            CapabilitySet::new().with(well_known::RECORDS),
            record_declaration_scenario,
        )?
        .register(
            PATTERN_MATCHING_SWITCH,
            CapabilitySet::new().with(well_known::PATTERN_SWITCH),
            pattern_switch_scenario,
        )?;
    Ok(catalog)
}

fn names_of(unit: &SourceUnit, kind: ConstructKind) -> Vec<String> {
    unit.constructs_of(kind).filter_map(|c| c.name.clone()).collect()
}

fn add_import_scenario(fe: &dyn FrontEnd) -> ScenarioResult {
    let before = "
        package com.example;

        import java.util.List;

        class Registry {
            List<String> names;
        }
    ";
    rewrite_run(
        fe,
        |unit| {
            add_import(unit, "java.util.Map");
        },
        &SourceSpec::changed(
            before,
            "
            package com.example;

            import java.util.List;
            import java.util.Map;

            class Registry {
                List<String> names;
            }
            ",
        ),
    )?;

    // already imported, same package, implicit package
    rewrite_run(
        fe,
        |unit| {
            add_import(unit, "java.util.List");
            add_import(unit, "com.example.Sibling");
            add_import(unit, "java.lang.String");
        },
        &SourceSpec::unchanged(before),
    )?;

    rewrite_run(
        fe,
        |unit| {
            add_import(unit, "java.util.List");
        },
        &SourceSpec::changed(
            "
            class Empty {
            }
            ",
            "
            import java.util.List;

            class Empty {
            }
            ",
        ),
    )?;
    Ok(())
}

fn order_imports_scenario(fe: &dyn FrontEnd) -> ScenarioResult {
    rewrite_run(
        fe,
        |unit| {
            order_imports(unit);
        },
        &SourceSpec::changed(
            "
            package com.example;

            import static org.junit.Assert.assertTrue;
            import java.util.Set;
            import java.util.List;
            import java.util.Set;

            class Sorting {
            }
            ",
            "
            package com.example;

            import java.util.List;
            import java.util.Set;
            import static org.junit.Assert.assertTrue;

            class Sorting {
            }
            ",
        ),
    )?;
    Ok(())
}

fn remove_unused_imports_scenario(fe: &dyn FrontEnd) -> ScenarioResult {
    let unit = rewrite_run(
        fe,
        |unit| {
            remove_unused_imports(unit);
        },
        &SourceSpec::changed(
            "
            package com.example;

            import java.util.List;
            import java.util.Map;
            import java.util.Set;
            import static java.util.Collections.emptyList;

            class Inventory {
                List<String> items = emptyList();
                Set<String> tags;
            }
            ",
            "
            package com.example;

            import java.util.List;
            import java.util.Set;
            import static java.util.Collections.emptyList;

            class Inventory {
                List<String> items = emptyList();
                Set<String> tags;
            }
            ",
        ),
    )?;
    expect_eq("declared types", vec!["Inventory".to_string()], names_of(&unit, ConstructKind::Class))
}

fn change_package_scenario(fe: &dyn FrontEnd) -> ScenarioResult {
    rewrite_run(
        fe,
        |unit| {
            change_package(unit, "com.example.legacy", "com.example.modern");
        },
        &SourceSpec::changed(
            "
            package com.example.legacy;

            import com.example.legacy.util.Strings;
            import com.example.legacyapi.Client;

            class Service {
                Client client;
            }
            ",
            "
            package com.example.modern;

            import com.example.modern.util.Strings;
            import com.example.legacyapi.Client;

            class Service {
                Client client;
            }
            ",
        ),
    )?;
    Ok(())
}

fn local_variable_inference_scenario(fe: &dyn FrontEnd) -> ScenarioResult {
    let unit = rewrite_run(
        fe,
        |unit| {
            remove_unused_imports(unit);
        },
        &SourceSpec::unchanged(
            "
            import java.util.ArrayList;

            class Inference {
                void fill() {
                    var names = new ArrayList<String>();
                    for (var name : names) {
                        System.out.println(name);
                    }
                }
            }
            ",
        ),
    )?;
    expect_eq(
        "inferred locals",
        vec!["names".to_string(), "name".to_string()],
        names_of(&unit, ConstructKind::LocalVar),
    )
}

fn text_block_scenario(fe: &dyn FrontEnd) -> ScenarioResult {
    let unit = rewrite_run(
        fe,
        |unit| {
            add_import(unit, "java.util.List");
        },
        &SourceSpec::changed(
            r#"
            class Query {
                String sql = """
                    SELECT name
                      FROM users
                     WHERE active
                    """;
            }
            "#,
            r#"
            import java.util.List;

            class Query {
                String sql = """
                    SELECT name
                      FROM users
                     WHERE active
                    """;
            }
            "#,
        ),
    )?;
    expect_eq("text blocks", 1, unit.constructs_of(ConstructKind::TextBlock).count())
}

fn record_declaration_scenario(fe: &dyn FrontEnd) -> ScenarioResult {
    let unit = rewrite_run(
        fe,
        |unit| {
            change_package(unit, "com.example.geometry", "com.example.shapes");
        },
        &SourceSpec::changed(
            "
            package com.example.geometry;

            record Point(int x, int y) {
                Point {
                    if (x < 0) throw new IllegalArgumentException();
                }
            }
            ",
            "
            package com.example.shapes;

            record Point(int x, int y) {
                Point {
                    if (x < 0) throw new IllegalArgumentException();
                }
            }
            ",
        ),
    )?;
    expect_eq("records", vec!["Point".to_string()], names_of(&unit, ConstructKind::Record))
}

fn pattern_switch_scenario(fe: &dyn FrontEnd) -> ScenarioResult {
    let unit = rewrite_run(
        fe,
        |unit| {
            remove_unused_imports(unit);
        },
        &SourceSpec::unchanged(
            "
            sealed interface Shape permits Circle, Square {}

            final class Circle implements Shape { double r; }

            final class Square implements Shape { double side; }

            class Area {
                double of(Shape shape) {
                    return switch (shape) {
                        case Circle c -> c.r * c.r * Math.PI;
                        case Square s -> s.side * s.side;
                    };
                }
            }
            ",
        ),
    )?;
    expect_eq(
        "type patterns",
        vec!["Circle".to_string(), "Square".to_string()],
        names_of(&unit, ConstructKind::TypePattern),
    )?;
    expect_eq(
        "sealed hierarchy",
        vec!["Shape".to_string()],
        names_of(&unit, ConstructKind::Interface),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::front_end::JavaFrontEnd;
    use tck_backend::FrontEndError;
    use tck_scenario::ScenarioError;

    fn run_on(dialect: Dialect, body: fn(&dyn FrontEnd) -> ScenarioResult) -> ScenarioResult {
        let fe = JavaFrontEnd::new(dialect).unwrap();
        body(&fe)
    }

    #[test]
    fn catalog_has_every_sample() {
        let catalog = catalog().unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(
            names,
            vec![
                ADD_IMPORT,
                ORDER_IMPORTS,
                REMOVE_UNUSED_IMPORTS,
                CHANGE_PACKAGE,
                LOCAL_VARIABLE_INFERENCE,
                TEXT_BLOCK_ROUND_TRIP,
                RECORD_DECLARATION,
                PATTERN_MATCHING_SWITCH,
            ]
        );
        assert!(catalog.get(ADD_IMPORT).unwrap().required_capabilities().is_empty());
        assert!(catalog
            .get(PATTERN_MATCHING_SWITCH)
            .unwrap()
            .required_capabilities()
            .contains(well_known::PATTERN_SWITCH));
    }

    #[test]
    fn baseline_scenarios_pass_on_every_dialect() {
        for dialect in Dialect::ALL {
            for body in [
                add_import_scenario as fn(&dyn FrontEnd) -> ScenarioResult,
                order_imports_scenario,
                remove_unused_imports_scenario,
                change_package_scenario,
            ] {
                run_on(dialect, body).unwrap();
            }
        }
    }

    #[test]
    fn gated_scenarios_pass_where_supported() {
        run_on(Dialect::Java11, local_variable_inference_scenario).unwrap();
        run_on(Dialect::Java17, text_block_scenario).unwrap();
        run_on(Dialect::Java17, record_declaration_scenario).unwrap();
        run_on(Dialect::Java21, pattern_switch_scenario).unwrap();
    }

    #[test]
    fn gated_scenarios_are_rejected_below_their_dialect() {
        let err = run_on(Dialect::Java8, local_variable_inference_scenario).unwrap_err();
        assert!(matches!(err, ScenarioError::Rejected(FrontEndError::Syntax { .. })));
        let err = run_on(Dialect::Java17, pattern_switch_scenario).unwrap_err();
        assert!(matches!(err, ScenarioError::Rejected(FrontEndError::Syntax { .. })));
    }
}
