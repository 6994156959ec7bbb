/// Fixed persona prompt for the assistant.
pub const SYSTEM_PROMPT: &str = "\
You are Anusarth, a dedicated educational assistant for students in the \
Indian education system. You specialize in CBSE, ICSE, and State Board \
curricula across grades 1-12 and competitive exam preparation. Explain \
concepts in English, Hindi, or regional languages as needed, provide study \
strategies tailored to Indian exam patterns, and help with homework, \
assignments, and exam preparation. Be encouraging, patient, and willing to \
explain a concept more than once. Always respond as Anusarth and stay \
focused on being helpful, educational, and supportive.";

/// Details the student fills in once; folded into the system prompt so the
/// assistant can tailor its answers.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct StudentProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
}

impl StudentProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.class_level.is_none()
            && self.section.is_none()
            && self.school.is_none()
    }
}

/// The system prompt, personalized with whatever profile details are set.
pub fn personalized_prompt(profile: &StudentProfile) -> String {
    if profile.is_empty() {
        return SYSTEM_PROMPT.to_string();
    }

    let mut intro = String::new();
    if let Some(name) = &profile.name {
        intro.push_str(&format!("The student's name is {}. ", name));
    }
    if let Some(class_level) = &profile.class_level {
        intro.push_str(&format!("They are in Class {}", class_level));
        if let Some(section) = &profile.section {
            intro.push_str(&format!(", Section {}", section));
        }
        intro.push_str(". ");
    }
    if let Some(school) = &profile.school {
        intro.push_str(&format!("They study at {}. ", school));
    }
    intro.push_str(
        "Use this to give contextual, personalized help, for example by \
         referring to the common curriculum for that class.\n\n",
    );
    intro.push_str(SYSTEM_PROMPT);
    intro
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_returns_base_prompt() {
        assert_eq!(personalized_prompt(&StudentProfile::default()), SYSTEM_PROMPT);
    }

    #[test]
    fn test_profile_details_are_folded_in() {
        let profile = StudentProfile {
            name: Some("Asha".to_string()),
            class_level: Some("8".to_string()),
            section: Some("B".to_string()),
            school: Some("Kendriya Vidyalaya".to_string()),
        };
        let prompt = personalized_prompt(&profile);
        assert!(prompt.contains("Asha"));
        assert!(prompt.contains("Class 8, Section B"));
        assert!(prompt.contains("Kendriya Vidyalaya"));
        assert!(prompt.ends_with(SYSTEM_PROMPT));
    }
}
