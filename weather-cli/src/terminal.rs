use inquire::{Confirm, Select};
use std::io::{self, Write};

use weather_core::{DisplayModel, PermissionStatus, ScreenUi};

const ALLOW: &str = "Allow";
const DENY: &str = "Deny";
const NEVER: &str = "Deny and don't ask again";

/// Screen surface on a terminal: notices and the loading line go to stderr,
/// the rendered weather to stdout.
#[derive(Debug, Default)]
pub struct TerminalUi {
    /// Print the model as JSON instead of the text layout.
    pub json: bool,
    /// Never prompt; undecided permission counts as denied.
    pub non_interactive: bool,
    loading: bool,
}

impl TerminalUi {
    pub fn new(json: bool, non_interactive: bool) -> Self {
        Self { json, non_interactive, loading: false }
    }
}

impl ScreenUi for TerminalUi {
    fn notice(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn show_permission_rationale(&mut self) -> bool {
        if self.non_interactive {
            return false;
        }
        Confirm::new(
            "It looks like you have turned off the location lookup required for this feature. \
             Ask again?",
        )
        .with_help_message("You can also set location.latitude / location.longitude in the config")
        .with_default(false)
        .prompt()
        .unwrap_or(false)
    }

    fn ask_location_permission(&mut self) -> PermissionStatus {
        if self.non_interactive {
            return PermissionStatus::Denied;
        }
        let answer = Select::new(
            "Look up your approximate location from your IP address (sent to the lookup service)?",
            vec![ALLOW, DENY, NEVER],
        )
        .prompt();

        match answer {
            Ok(ALLOW) => PermissionStatus::Granted,
            Ok(NEVER) => PermissionStatus::PermanentlyDenied,
            _ => PermissionStatus::Denied,
        }
    }

    fn show_loading(&mut self) {
        self.loading = true;
        eprint!("Loading weather...");
        let _ = io::stderr().flush();
    }

    fn hide_loading(&mut self) {
        if self.loading {
            self.loading = false;
            eprint!("\r{:18}\r", "");
            let _ = io::stderr().flush();
        }
    }

    fn render(&mut self, model: &DisplayModel) {
        if self.json {
            match serde_json::to_string_pretty(model) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("Failed to serialize weather: {e}"),
            }
        } else {
            print!("{}", format_model(model));
        }
    }
}

/// Text layout of the weather screen.
pub fn format_model(model: &DisplayModel) -> String {
    let glyph = model.icon.map(|i| i.glyph()).unwrap_or(" ");
    let mut out = String::new();

    out.push_str(&format!("{}, {}\n", model.place, model.country));
    out.push_str(&format!("{glyph}  {}  {}\n", model.condition, model.description));
    out.push_str(&format!("   {}  ({}, {})\n", model.temperature, model.temp_min, model.temp_max));
    out.push_str(&format!("   Humidity: {}\n", model.humidity));
    out.push_str(&format!("   Wind:     {}\n", model.wind_speed));
    out.push_str(&format!("   Sunrise:  {}   Sunset: {}\n", model.sunrise, model.sunset));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::IconCategory;

    fn model() -> DisplayModel {
        DisplayModel {
            condition: "Rain".into(),
            description: "light rain".into(),
            temperature: "9.5°C".into(),
            sunrise: "07:12".into(),
            sunset: "16:05".into(),
            humidity: "87 per cent".into(),
            temp_min: "8.0 min".into(),
            temp_max: "11.0 max".into(),
            wind_speed: "5.1".into(),
            place: "London".into(),
            country: "GB".into(),
            icon: Some(IconCategory::Rain),
        }
    }

    #[test]
    fn format_contains_all_fields() {
        let text = format_model(&model());
        assert!(text.starts_with("London, GB\n"));
        assert!(text.contains("🌧  Rain  light rain"));
        assert!(text.contains("9.5°C  (8.0 min, 11.0 max)"));
        assert!(text.contains("Humidity: 87 per cent"));
        assert!(text.contains("Sunrise:  07:12   Sunset: 16:05"));
    }

    #[test]
    fn non_interactive_never_prompts() {
        let mut ui = TerminalUi::new(false, true);
        assert_eq!(ui.ask_location_permission(), PermissionStatus::Denied);
        assert!(!ui.show_permission_rationale());
    }
}
