//! Decides which source events get mirrored and how copies are colored.

pub mod group;
pub mod class_half;
pub mod color;

pub use class_half::pertains_to_half;
pub use color::color_for;
pub use group::GroupMatcher;

use crate::calendar::{ColorTag, SourceEvent};
use crate::storage::config::{ClassifierConfig, EligibilityRule};

/// Every signal the classifier computed for one event, plus the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub has_keyword: bool,
    pub has_group_match: bool,
    pub has_location_match: bool,
    pub has_mandatory: bool,
    pub pertains_to_half: bool,
    pub eligible: bool,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rule: EligibilityRule,
    keywords: Vec<String>,
    location_keywords: Vec<String>,
    mandatory_keywords: Vec<String>,
    groups: GroupMatcher,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            rule: config.eligibility_rule,
            keywords: lowered_keywords(&config.keywords),
            location_keywords: lowered_keywords(&config.location_keywords),
            mandatory_keywords: lowered_keywords(&config.mandatory_keywords),
            groups: GroupMatcher::new(config.group_number, &config.subgroup),
        }
    }

    pub fn assess(&self, event: &SourceEvent) -> Assessment {
        let title = event.title.to_lowercase();
        let description = event.description.as_deref().unwrap_or_default().to_lowercase();
        let location = event.location.as_deref().unwrap_or_default().to_lowercase();

        let has_keyword = self
            .keywords
            .iter()
            .any(|k| title.contains(k.as_str()) || description.contains(k.as_str()));
        let has_group_match = self.groups.matches(&title);
        let has_location_match = self
            .location_keywords
            .iter()
            .any(|k| location.contains(k.as_str()));
        let has_mandatory = self
            .mandatory_keywords
            .iter()
            .any(|k| title.contains(k.as_str()));
        let pertains_to_half = pertains_to_half(&title);

        let eligible = match self.rule {
            EligibilityRule::Standard => {
                (!has_keyword || has_group_match) && pertains_to_half
            }
            EligibilityRule::LocationOrMandatory => {
                (has_keyword && has_group_match)
                    || (has_location_match && !has_keyword)
                    || (has_mandatory && !has_keyword)
            }
        };

        Assessment {
            has_keyword,
            has_group_match,
            has_location_match,
            has_mandatory,
            pertains_to_half,
            eligible,
        }
    }

    pub fn is_eligible(&self, event: &SourceEvent) -> bool {
        self.assess(event).eligible
    }

    pub fn color_for(&self, event: &SourceEvent) -> ColorTag {
        color_for(&event.title)
    }
}

fn lowered_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .map(|k| k.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{EventStatus, EventTime};
    use crate::storage::config::Config;
    use chrono::Utc;

    fn classifier_config(group_number: u32) -> ClassifierConfig {
        let mut config = Config::default().classifier;
        config.group_number = group_number;
        config
    }

    fn create_event(title: &str) -> SourceEvent {
        let start = Utc::now();
        SourceEvent {
            id: "evt".to_string(),
            status: EventStatus::Confirmed,
            title: title.to_string(),
            description: None,
            location: None,
            start: Some(EventTime::DateTime(start)),
            end: Some(EventTime::DateTime(start + chrono::Duration::hours(1))),
            last_modified: start,
        }
    }

    #[test]
    fn untagged_event_is_eligible_by_default() {
        let classifier = Classifier::new(&classifier_config(17));
        assert!(classifier.is_eligible(&create_event("Anatomy Lecture")));
    }

    #[test]
    fn tagged_event_for_our_group_is_eligible() {
        let classifier = Classifier::new(&classifier_config(17));
        let assessment = classifier.assess(&create_event("Group 17 Midterm"));

        assert!(assessment.has_keyword);
        assert!(assessment.has_group_match);
        assert!(assessment.eligible);
    }

    #[test]
    fn tagged_event_for_another_group_is_not_eligible() {
        let classifier = Classifier::new(&classifier_config(17));
        assert!(!classifier.is_eligible(&create_event("Group 12 Small Group")));
    }

    #[test]
    fn group_list_title_counts_as_tagged() {
        let classifier = Classifier::new(&classifier_config(17));

        assert!(classifier.is_eligible(&create_event("Groups 10-20, 25: CBTL")));
        assert!(!classifier.is_eligible(&create_event("Groups 1-5: CBTL")));
    }

    #[test]
    fn keyword_in_description_counts_as_tagged() {
        let classifier = Classifier::new(&classifier_config(17));
        let mut event = create_event("Clinical Skills");
        event.description = Some("Bring your group roster".to_string());

        assert!(!classifier.is_eligible(&event));
    }

    #[test]
    fn second_half_marker_vetoes_eligible_event() {
        let classifier = Classifier::new(&classifier_config(17));

        assert!(!classifier.is_eligible(&create_event("Group 17 Review M2")));
        assert!(classifier.is_eligible(&create_event("Group 17 Review M1/M2")));
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let mut config = classifier_config(17);
        config.keywords.push("  ".to_string());
        let classifier = Classifier::new(&config);

        assert!(!classifier.assess(&create_event("Anatomy Lecture")).has_keyword);
    }

    #[test]
    fn keyword_whitespace_is_significant() {
        let mut config = classifier_config(17);
        config.keywords = vec!["Group ".to_string()];
        let classifier = Classifier::new(&config);

        assert!(classifier.assess(&create_event("Group 17 Midterm")).has_keyword);
        assert!(!classifier.assess(&create_event("Groups 10-20: CBTL")).has_keyword);
    }

    #[test]
    fn location_and_mandatory_signals_are_reported() {
        let classifier = Classifier::new(&classifier_config(17));
        let mut event = create_event("Renal Quiz");
        event.location = Some("Carroll Hall 101".to_string());

        let assessment = classifier.assess(&event);

        assert!(assessment.has_location_match);
        assert!(assessment.has_mandatory);
    }

    #[test]
    fn alternate_rule_needs_location_or_mandatory_keyword() {
        let mut config = classifier_config(17);
        config.eligibility_rule = EligibilityRule::LocationOrMandatory;
        let classifier = Classifier::new(&config);

        let mut in_hall = create_event("Anatomy Lecture");
        in_hall.location = Some("Carroll Hall".to_string());
        let elsewhere = create_event("Anatomy Lecture");

        assert!(classifier.is_eligible(&in_hall));
        assert!(!classifier.is_eligible(&elsewhere));
        assert!(classifier.is_eligible(&create_event("Renal Quiz")));
    }

    #[test]
    fn alternate_rule_skips_class_half_filter() {
        let mut config = classifier_config(17);
        config.eligibility_rule = EligibilityRule::LocationOrMandatory;
        let classifier = Classifier::new(&config);

        assert!(classifier.is_eligible(&create_event("Group 17 Review M2")));
    }

    #[test]
    fn color_follows_title() {
        let classifier = Classifier::new(&classifier_config(17));
        assert_eq!(
            classifier.color_for(&create_event("Group 17 Midterm")),
            ColorTag::Tangerine
        );
    }
}
