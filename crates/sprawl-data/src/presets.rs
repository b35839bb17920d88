//! The stock template set, embedded at compile time.

use crate::loader::{build_catalog, parse_str, DataLoadError, Format};
use crate::schema::TemplateData;
use sprawl_core::template::TemplateCatalog;
use std::path::Path;

/// Source of the stock templates, in registration order.
pub const BUILTIN_TEMPLATES: &str = include_str!("../data/templates.ron");

/// Keys of the stock templates, in registration order.
pub const PRESET_KEYS: [&str; 5] = [
    "residential-line",
    "industry-l",
    "hub-cross",
    "research-z",
    "power-core",
];

fn builtin_path() -> &'static Path {
    Path::new("<builtin>/templates.ron")
}

/// Parse the stock templates.
pub fn builtin_templates() -> Result<Vec<TemplateData>, DataLoadError> {
    parse_str(BUILTIN_TEMPLATES, Format::Ron, builtin_path())
}

/// The stock catalog, with decay coefficients drawn from `seed`.
pub fn builtin_catalog(seed: u64) -> Result<TemplateCatalog, DataLoadError> {
    build_catalog(builtin_templates()?, builtin_path(), seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprawl_core::template::GrowthType;
    use sprawl_core::test_utils::fixture_catalog;

    #[test]
    fn builtin_keys_in_order() {
        let catalog = builtin_catalog(42).unwrap();
        let keys: Vec<&str> = catalog.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, PRESET_KEYS);
    }

    #[test]
    fn builtin_matches_core_fixtures() {
        let builtin = builtin_catalog(42).unwrap();
        let fixture = fixture_catalog();
        assert_eq!(builtin.len(), fixture.len());
        for (a, b) in builtin.iter().zip(fixture.iter()) {
            assert_eq!(a, b, "template {} differs", a.key);
        }
    }

    #[test]
    fn seed_42_decay_coefficients() {
        let catalog = builtin_catalog(42).unwrap();
        let expected = [
            ("residential-line", 1.000_551_875_960_081_8),
            ("industry-l", 0.924_145_279_498_770_8),
            ("hub-cross", 1.126_232_896_745_204_9),
            ("research-z", 1.034_867_020_719_684_6),
            ("power-core", 0.787_406_949_372_962_1),
        ];
        for (key, decay) in expected {
            let template = catalog.get(catalog.require(key).unwrap()).unwrap();
            assert!(
                (template.decay - decay).abs() < 1e-12,
                "{key}: got {}, want {decay}",
                template.decay
            );
        }
    }

    #[test]
    fn builtin_template_details() {
        let catalog = builtin_catalog(1).unwrap();
        let hub = catalog.get(catalog.require("hub-cross").unwrap()).unwrap();
        assert!(hub.is_hub());
        assert!(hub.auto_connect);
        assert_eq!(hub.range, 3);

        let core = catalog.get(catalog.require("power-core").unwrap()).unwrap();
        assert_eq!(core.growth, GrowthType::Exponential);
        assert_eq!(core.shape.len(), 3);
        assert_eq!(core.distinct_port_directions(), 4);

        let line = catalog.get(catalog.require("residential-line").unwrap()).unwrap();
        assert!(!line.auto_connect);
        assert_eq!(line.base_cap, 4);
    }
}
