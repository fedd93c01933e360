// Prompts for the model-backed assistant.
// Placeholders in braces are substituted with `str::replace` before sending.

pub const GENERATE_SYSTEM: &str = "You are an expert résumé writer. \
    You turn a candidate's free-text description of their background into \
    structured résumé content. Only use facts present in the description; \
    never invent employers, dates, degrees or metrics. \
    You MUST respond with valid JSON only.";

pub const GENERATE_PROMPT_TEMPLATE: &str = r#"Candidate description:
"""
{description}
"""

Target job title: {job_title}

Return a JSON object with these optional keys (omit a key when the description gives nothing for it):
{
  "summary": "2-3 sentence professional summary",
  "skills": [{"name": "...", "level": "Beginner|Intermediate|Advanced|Expert", "category": "Technical|Soft Skills|Business|Other"}],
  "experience": [{"company": "...", "position": "...", "startDate": "YYYY-MM", "endDate": "YYYY-MM", "current": false, "description": "...", "achievements": ["..."]}],
  "education": [{"institution": "...", "degree": "...", "field": "...", "graduationDate": "YYYY-MM"}],
  "projects": [{"name": "...", "description": "...", "technologies": ["..."]}]
}
Leave every "id" out; ids are assigned by the server."#;

pub const ATS_SYSTEM: &str = "You are an applicant tracking system analyst. \
    You score how well a résumé would pass automated screening for a job \
    description and give concrete, short suggestions. \
    You MUST respond with valid JSON only.";

pub const ATS_PROMPT_TEMPLATE: &str = r#"Résumé (JSON):
{resume_json}

Job description:
"""
{job_description}
"""

Return a JSON object:
{
  "score": <integer 0-100>,
  "suggestions": ["short actionable suggestion", "..."],
  "keywords": ["important keyword from the job description", "..."]
}"#;
