use super::PackageStep;

pub fn step() -> PackageStep {
    PackageStep {
        name: "pest",
        label: "PestPHP",
        detect: &["pestphp/pest", "pestphp/pest-plugin-laravel"],
        install: &["pestphp/pest", "pestphp/pest-plugin-laravel"],
        config: None,
        allow_plugin: None,
        ignore_entry: None,
    }
}
