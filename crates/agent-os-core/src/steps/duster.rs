use super::PackageStep;

pub fn step() -> PackageStep {
    PackageStep {
        name: "duster",
        label: "Tighten Duster",
        detect: &["tightenco/duster"],
        install: &["tightenco/duster"],
        config: None,
        allow_plugin: None,
        ignore_entry: None,
    }
}
