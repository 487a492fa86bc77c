use console::{Emoji, style};

pub static SUCCESS_ICON: Emoji<'_, '_> = Emoji("✅ ", "");
pub static INFO_ICON: Emoji<'_, '_> = Emoji("ℹ️  ", "");
pub static WARN_ICON: Emoji<'_, '_> = Emoji("⚠️  ", "");
pub static ERROR_ICON: Emoji<'_, '_> = Emoji("❌ ", "");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

pub fn print_success(msg: &str) {
    println!("{} {}", SUCCESS_ICON, style(msg).green());
}

pub fn print_info(msg: &str) {
    println!("{} {}", INFO_ICON, style(msg).blue());
}

pub fn print_warn(msg: &str) {
    println!("{} {}", WARN_ICON, style(msg).yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", ERROR_ICON, style(msg).red().bold());
}

pub fn print_step(step: &str) {
    println!("{} {}", SPARKLE, style(step).bold());
}

pub fn print_status(label: &str, msg: &str) {
    println!("  {} {}: {}", GEAR, style(label).bold().cyan(), msg);
}

/// A titled block of command descriptions for the help screen.
pub struct GuideSection {
    title: &'static str,
    commands: Vec<(&'static str, &'static str)>,
}

impl GuideSection {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            commands: Vec::new(),
        }
    }

    pub fn command(mut self, name: &'static str, description: &'static str) -> Self {
        self.commands.push((name, description));
        self
    }

    pub fn print(self) {
        println!(" {}", style(self.title).bold().underlined());
        for (name, description) in self.commands {
            println!("   {:<10} {}", style(name).green(), description);
        }
        println!();
    }
}

pub fn print_banner() {
    let lines: &[&str] = &[
        "     _                         ",
        "  __| | ___  _ __  _ __   __ _ ",
        " / _` |/ _ \\| '_ \\| '_ \\ / _` |",
        "| (_| | (_) | | | | | | | (_| |",
        " \\__,_|\\___/|_| |_|_| |_|\\__,_|",
    ];

    println!();
    for line in lines {
        println!("{}", style(line).cyan().bold());
    }
    println!("{}\n", style("Your tasks, in plain English.").cyan());
}

pub fn print_goodbye() {
    println!(
        "\n{} {}",
        SPARKLE,
        style("Thank you for using donna. See you next time!")
            .bold()
            .cyan()
    );
}
