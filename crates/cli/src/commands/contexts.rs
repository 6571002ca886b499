//! `parley contexts`: List the built-in context presets.

use parley_core::ContextPreset;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render());
    Ok(())
}

fn render() -> String {
    let mut out = String::from("📚 Context presets\n==================\n");
    for preset in ContextPreset::ALL {
        let marker = if preset == ContextPreset::default() {
            " (default)"
        } else {
            ""
        };
        out.push_str(&format!("\n  {}{marker}\n", preset.name()));
        for turn in preset.prefix().turns() {
            out.push_str(&format!("    [{}] {}\n", turn.role(), turn.content()));
        }
    }
    out.push_str("\n  Select one with `[context] preset = \"...\"` or PARLEY_CONTEXT.\n");
    out
}
