//! Prompt templates and the JSON schema sent to the model.
use pulse_common::SocialPlatform;
use serde_json::{json, Value as JsonValue};

const LIST_RULES: &str = "The values for 'what_customers_love' and 'key_areas_of_dissatisfaction' must be arrays of separate, short strings. Do not combine multiple points into a single long string.";

/// Prompt for an arbitrary post, given either as text or as a URL.
pub fn post_prompt(platform: SocialPlatform, post: &str, is_url: bool) -> String {
    let subject = if is_url {
        format!("the post at this URL: {post}")
    } else {
        format!("the following post content: \"{post}\"")
    };

    format!(
        r#"
Analyze {subject}.
The post is from the platform: {platform}.
Provide a detailed analysis covering the following areas:
- Overall performance score (0-100)
- Positive feedback as an object with 'common_themes' (an array of strings) and 'what_customers_love' (an array of short, distinct string bullet points, each highlighting a specific praised aspect).
- Negative feedback as an object with 'common_themes' (an array of strings) and 'key_areas_of_dissatisfaction' (an array of short, distinct string bullet points, each highlighting a specific issue).
- Suggested improvements (actionable advice, categorized by area like "Hashtags" or "Caption").
- (Optional) Competitor comparison if relevant information is available.

Format your response as a JSON object that adheres to the provided schema. {LIST_RULES} If using a search tool, just return the JSON object directly.
"#
    )
}

/// Prompt for the featured Instagram profile, including its history.
pub fn profile_prompt(profile_url: &str) -> String {
    format!(
        r#"
Analyze the Instagram profile at this URL: {profile_url}

You are an expert social media analyst. Provide a detailed analysis of this profile's overall strategy, recent posts, and engagement, including a historical analysis of its performance over time.

Your analysis must cover these specific areas:
1. Overall performance score: a single number from 0-100 based on content strategy, engagement, and profile presentation.
2. Positive feedback: an object containing 'common_themes' (an array of strings) and 'what_customers_love' (an array of short, distinct string bullet points).
3. Negative feedback: an object containing 'common_themes' (an array of strings) and 'key_areas_of_dissatisfaction' (an array of short, distinct string bullet points).
4. Suggested improvements: an array of objects, each with an 'area' (e.g. "Bio", "Content Strategy") and a 'suggestion' (actionable advice).
5. Historical analysis: an object containing 'content_evolution', 'engagement_trends', and 'key_milestones', each an array of strings.

IMPORTANT: Your entire response MUST be a single, valid JSON object with no text before or after it. Every string array must contain separate, distinct points rather than one long string with newlines.
"#
    )
}

/// Prompt for the online reputation of a business (Maps + Search grounded).
pub fn reviews_prompt(business: &str) -> String {
    format!(
        r#"
Analyze the online reputation of the business: "{business}".

You may not have access to the full text of individual Google Reviews. Base your analysis on the aggregate data available from Google Maps (average star rating, review count) and supplement it with Google Search results (news articles, social media mentions, other pages discussing the business).

Provide a detailed analysis covering the following areas:
- Overall performance score (0-100) based on average rating, review volume, and overall online sentiment.
- Positive feedback as an object with 'common_themes' (an array of strings) and 'what_customers_love' (an array of short, distinct string bullet points inferred from your search).
- Negative feedback as an object with 'common_themes' (an array of strings) and 'key_areas_of_dissatisfaction' (an array of short, distinct string bullet points inferred from your search).
- Suggested improvements (actionable advice based on the overall reputation, categorized by area like "Online Presence" or "Customer Service Perception").

If you cannot find sufficient information to perform an analysis, respond with a clear message explaining the issue instead of a JSON object.

Otherwise, your entire response must be a single, valid JSON object that adheres to the structure described. {LIST_RULES}
"#
    )
}

fn string_array(description: &str) -> JsonValue {
    json!({ "type": "ARRAY", "items": { "type": "STRING" }, "description": description })
}

/// Response schema enforced when no grounding tool is in play.
pub fn analysis_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "overall_score": {
                "type": "NUMBER",
                "description": "Overall score from 0 to 100 based on engagement, sentiment, and content quality."
            },
            "positive_feedback": {
                "type": "OBJECT",
                "description": "Structured positive feedback about the post.",
                "properties": {
                    "common_themes": string_array("Common themes found in positive feedback."),
                    "what_customers_love": string_array("Specific aspects that are highly praised.")
                },
                "required": ["common_themes", "what_customers_love"]
            },
            "negative_feedback": {
                "type": "OBJECT",
                "description": "Structured negative feedback about the post.",
                "properties": {
                    "common_themes": string_array("Common themes found in negative feedback."),
                    "key_areas_of_dissatisfaction": string_array("Specific aspects that are sources of dissatisfaction.")
                },
                "required": ["common_themes", "key_areas_of_dissatisfaction"]
            },
            "suggested_improvements": {
                "type": "ARRAY",
                "description": "Actionable suggestions to improve future posts, categorized by area.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "area": { "type": "STRING", "description": "The area of improvement, e.g. \"Hashtags\", \"Caption\", \"Visuals\"." },
                        "suggestion": { "type": "STRING", "description": "The concrete suggestion for that area." }
                    },
                    "required": ["area", "suggestion"]
                }
            },
            "competitor_comparison": {
                "type": "ARRAY",
                "description": "Optional: brief analysis of how this post compares to competitors.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "analysis": { "type": "STRING" }
                    },
                    "required": ["name", "analysis"]
                }
            },
            "historical_analysis": {
                "type": "OBJECT",
                "properties": {
                    "content_evolution": string_array("How the content style, themes, and quality have changed over time."),
                    "engagement_trends": string_array("Patterns in likes, comments, and follower growth over time."),
                    "key_milestones": string_array("Significant events, successful campaigns, or major shifts in strategy.")
                },
                "required": ["content_evolution", "engagement_trends", "key_milestones"]
            }
        },
        "required": ["overall_score", "positive_feedback", "negative_feedback", "suggested_improvements"]
    })
}
