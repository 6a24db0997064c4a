pub const ADVENTURE_SYSTEM: &str = include_str!("../data/prompts/adventure_system.txt");
pub const ADVENTURE_KICKOFF: &str = include_str!("../data/prompts/adventure_kickoff.txt");
pub const TURN_SYSTEM: &str = include_str!("../data/prompts/turn_system.txt");
pub const TURN_KICKOFF: &str = include_str!("../data/prompts/turn_kickoff.txt");
pub const FINAL_TURN: &str = include_str!("../data/prompts/final_turn.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
