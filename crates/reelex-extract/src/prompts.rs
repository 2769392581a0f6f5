//! Per-category instructional prompts for the generation backend.

use reelex_core::Category;

/// Single-shot classification prompt over the closed label set.
pub fn detection_prompt() -> String {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    format!(
        "Analyze this video content and determine its category.\n\n\
         Categories: {}\n\n\
         Return ONLY the category name (one word) from the list above.",
        labels.join(", ")
    )
}

/// Category-specific extraction instructions.
pub fn extraction_prompt(category: Category) -> &'static str {
    match category {
        Category::Workout => {
            "Analyze this workout video and extract the complete workout routine.\n\n\
             Extract:\n\
             - Exercise names\n\
             - Sets and reps (if mentioned)\n\
             - Duration in seconds (for time-based exercises)\n\
             - Rest periods between exercises\n\
             - Total rounds/circuits\n\
             - Estimated total duration\n\
             - Difficulty level (beginner/intermediate/advanced)\n\
             - Music tempo in BPM (if detectable)\n\n\
             Return the data in JSON format."
        }
        Category::Recipe => {
            "Analyze this cooking video and extract the complete recipe.\n\n\
             Extract:\n\
             - All ingredients with quantities (e.g., \"2 cups flour\")\n\
             - Step-by-step cooking instructions\n\
             - Duration for each step (if mentioned)\n\
             - Utensils/tools needed for each step\n\
             - Prep time, cook time, servings\n\
             - Cuisine type\n\n\
             Return the data in JSON format."
        }
        Category::Travel => {
            "Analyze this travel video and extract the complete itinerary.\n\n\
             Extract:\n\
             - Destination location\n\
             - All activities and places to visit\n\
             - Locations/addresses\n\
             - Booking links (if visible)\n\
             - Estimated duration for each activity\n\
             - Day-by-day breakdown (if applicable)\n\
             - Estimated budget\n\n\
             Return the data in JSON format."
        }
        Category::Product => {
            "Analyze this product video and extract all products shown.\n\n\
             Extract:\n\
             - Product names\n\
             - Brand names\n\
             - Prices (as displayed) and currency\n\
             - Purchase links (if visible in video)\n\
             - Product categories\n\n\
             Return the data in JSON format."
        }
        Category::Educational => {
            "Analyze this tutorial video and extract the complete tutorial.\n\n\
             Extract:\n\
             - Topic/subject\n\
             - Step-by-step instructions\n\
             - Tools/software required for each step\n\
             - Resource links (if visible)\n\
             - Prerequisites\n\
             - Estimated time to complete\n\n\
             Return the data in JSON format."
        }
        Category::Music => {
            "Analyze this music video and extract song metadata.\n\n\
             Extract:\n\
             - Song title and artist name\n\
             - Genre\n\
             - Lyrics snippet (if audible)\n\
             - Spotify/YouTube links (if visible)\n\
             - Mood/vibe of the song\n\n\
             Return the data in JSON format."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_prompt_lists_all_labels() {
        let prompt = detection_prompt();
        for category in Category::ALL {
            assert!(prompt.contains(category.as_str()));
        }
    }

    #[test]
    fn test_every_category_has_a_prompt() {
        for category in Category::ALL {
            assert!(extraction_prompt(category).contains("JSON"));
        }
    }
}
