use colored::{ColoredString, Colorize};
use fitness_assess::models::{Grade, TestScore};

pub fn colored_grade(grade: Grade) -> ColoredString {
    let letter = grade.to_string();
    match grade {
        Grade::A | Grade::B => letter.green().bold(),
        Grade::C => letter.yellow().bold(),
        Grade::D | Grade::F => letter.red().bold(),
    }
}

pub fn print_score(score: &TestScore) {
    println!("{}", "Test Score".bold());
    println!("────────────────────────────────");
    println!("Raw score:          {:.1}", score.raw_score);
    println!("Percentile:         {}", score.percentile);
    println!("Standardized score: {}", score.standardized_score);
    println!("Grade:              {}", colored_grade(score.grade));
    println!();
    println!("{}", "Feedback".bold());
    for line in &score.feedback {
        println!("  • {}", line);
    }
}
