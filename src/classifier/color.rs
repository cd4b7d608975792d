use crate::calendar::ColorTag;

const ORANGE_WORDS: [&str; 4] = ["tbl", "cbtl", "quiz", "chapel"];
const RED_WORDS: [&str; 4] = ["midterm", "evaluation", "mandatory", "exam"];
const BLUE_WORDS: [&str; 3] = ["pqz", "flipped classroom", "panopto"];

/// Picks the copy's color from its title. Rules are applied orange, red,
/// blue, and the last one that applies wins.
pub fn color_for(title: &str) -> ColorTag {
    let title = title.to_lowercase();
    let mentions_any = |words: &[&str]| words.iter().any(|word| title.contains(word));

    let mut color = ColorTag::Basil;
    if mentions_any(&ORANGE_WORDS) {
        color = ColorTag::Flamingo;
    }
    if mentions_any(&RED_WORDS) {
        color = ColorTag::Tangerine;
    }
    if mentions_any(&BLUE_WORDS) {
        color = ColorTag::Blueberry;
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_title_is_basil() {
        assert_eq!(color_for("Anatomy Lecture"), ColorTag::Basil);
    }

    #[test]
    fn quiz_is_flamingo() {
        assert_eq!(color_for("Weekly Quiz"), ColorTag::Flamingo);
        assert_eq!(color_for("CHAPEL"), ColorTag::Flamingo);
    }

    #[test]
    fn red_word_overrides_orange() {
        assert_eq!(color_for("Midterm Quiz Session"), ColorTag::Tangerine);
    }

    #[test]
    fn blue_word_overrides_everything() {
        assert_eq!(color_for("Midterm Quiz Session panopto"), ColorTag::Blueberry);
    }

    #[test]
    fn multi_word_phrase_is_matched() {
        assert_eq!(color_for("Flipped Classroom: Renal"), ColorTag::Blueberry);
        assert_eq!(color_for("Flipped Renal Classroom"), ColorTag::Basil);
    }

    #[test]
    fn words_match_inside_longer_words() {
        assert_eq!(color_for("Examination Review"), ColorTag::Tangerine);
    }
}
