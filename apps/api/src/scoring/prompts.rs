// Match scoring prompt.

/// Replace `{candidate_json}` and `{job_json}` before sending.
pub const MATCH_SCORE_PROMPT_TEMPLATE: &str = r#"Calculate the match score between the candidate and the job.

Return a JSON object with these fields:
{
  "match_score": number between 0.0 and 1.0,
  "matching_skills": ["string"],
  "missing_skills": ["string"],
  "experience_match": "text explanation",
  "education_match": "text explanation",
  "overall_assessment": "text"
}

{no_extra_text}

Candidate: {candidate_json}

Job: {job_json}"#;
