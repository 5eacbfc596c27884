// LLM prompt templates for resume extraction and job enrichment.
// Placeholders are substituted with `str::replace` before sending.

/// Resume extraction prompt. Replace `{resume_text}` before sending.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured information from the following resume.

Return a JSON object with these fields:
{
  "name": "string",
  "email": "string",
  "phone": "string",
  "skills": ["string"],
  "education": [{"degree": "string", "institution": "string", "years": "string"}],
  "experience": [{"title": "string", "company": "string", "years": "string", "responsibilities": ["string"]}]
}

{no_extra_text}

Resume:
{resume_text}"#;

/// Job enrichment prompt. Replace `{title}`, `{company}` and `{description}`.
pub const JOB_ENRICH_PROMPT_TEMPLATE: &str = r#"Analyze the following job listing and extract structured information.

Return a JSON object with these fields:
{
  "keywords": ["string"],
  "required_skills": ["string"],
  "job_category": "string",
  "seniority_level": "string",
  "estimated_years_experience": number,
  "job_type": "full-time" | "part-time" | "contract" | "internship",
  "remote_options": "yes" | "no" | "hybrid"
}

{no_extra_text}

Job Title: {title}
Company: {company}
Job Description: {description}"#;
