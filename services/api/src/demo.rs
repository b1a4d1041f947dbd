use crate::infra::InMemorySessionRepository;
use aptitude::assessment::{
    score, AssessmentError, AssessmentService, AssessmentServiceError, LeadEdit, ResponseImporter,
    ScoreProfile, TaxonomyRegistry,
};
use aptitude::config::AppConfig;
use aptitude::error::AppError;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Assessment type to walk through
    #[arg(long = "type", default_value = "riasec")]
    pub(crate) assessment_type: String,
    /// Submit with a complete lead form on the first attempt
    #[arg(long)]
    pub(crate) skip_rejection: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Assessment type the export was collected for
    #[arg(long = "type")]
    pub(crate) assessment_type: String,
    /// CSV export with `question_id` and `option` columns
    #[arg(long)]
    pub(crate) answers_csv: PathBuf,
}

fn load_registry() -> Result<TaxonomyRegistry, AppError> {
    let config = AppConfig::load()?;
    Ok(TaxonomyRegistry::load(
        config.assessment.taxonomy_path.as_deref(),
    )?)
}

pub(crate) fn run_assessment_list() -> Result<(), AppError> {
    let registry = load_registry()?;

    println!("Registered assessments");
    for summary in registry.catalogue() {
        let categories: Vec<_> = summary
            .categories
            .iter()
            .map(|category| format!("{} ({})", category.label, category.id))
            .collect();
        println!(
            "- {} | {} | {} questions",
            summary.assessment_type, summary.title, summary.question_count
        );
        println!("  categories: {}", categories.join(", "));
    }
    Ok(())
}

pub(crate) fn run_assessment_score(args: ScoreArgs) -> Result<(), AppError> {
    let registry = load_registry()?;
    let taxonomy = registry.get(&args.assessment_type)?;
    let responses = ResponseImporter::from_path(&args.answers_csv, Arc::clone(&taxonomy))?;

    let profile = score(&responses, &taxonomy);
    println!(
        "Scored {} answers from {}",
        responses.len(),
        args.answers_csv.display()
    );
    render_profile(&profile);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let registry = TaxonomyRegistry::load(config.assessment.taxonomy_path.as_deref())?;
    let service = AssessmentService::new(
        Arc::new(registry),
        Arc::new(InMemorySessionRepository::with_capacity(
            config.assessment.session_capacity,
        )),
        config.assessment.lead_policy,
    );

    println!("Assessment demo ({})", args.assessment_type);
    let session = match service.start(&args.assessment_type) {
        Ok(session) => session,
        Err(err) => {
            println!("  Session could not start: {err}");
            return Ok(());
        }
    };
    let session_id = session.id().clone();
    println!("- Started session {}", session_id.0);

    // Rotate through each question's offered options so the profile has some spread.
    let mut progress = session.progress();
    for (index, question) in session.taxonomy().questions().iter().enumerate() {
        let Some(option) = question
            .options
            .get(index % question.options.len().max(1))
            .copied()
        else {
            continue;
        };
        progress = match service.record_answer(&session_id, question.id.clone(), option) {
            Ok(progress) => progress,
            Err(err) => {
                println!("  Answer to {} rejected: {err}", question.id);
                continue;
            }
        };
    }
    println!(
        "- Answered {}/{} questions ({}%)",
        progress.answered, progress.total, progress.value
    );

    for edit in demo_lead(!args.skip_rejection) {
        if let Err(err) = service.update_lead(&session_id, edit) {
            println!("  Lead edit rejected: {err}");
        }
    }

    match service.submit(&session_id) {
        Ok(profile) => {
            println!("- Results released on first submit");
            render_profile(&profile);
            return Ok(());
        }
        Err(AssessmentServiceError::Assessment(AssessmentError::Validation(error))) => {
            println!("- Results locked; lead form needs attention:");
            for (field, issue) in &error.failures {
                println!("    - {field}: {issue}");
            }
        }
        Err(err) => {
            println!("  Submit unavailable: {err}");
            return Ok(());
        }
    }

    let view = match service.update_lead(
        &session_id,
        LeadEdit::ConfirmPassword(DEMO_PASSWORD.to_string()),
    ) {
        Ok(view) => view,
        Err(err) => {
            println!("  Lead edit rejected: {err}");
            return Ok(());
        }
    };
    println!("- Corrected confirmation; gate is now {}", view.state.label());

    match service.submit(&session_id) {
        Ok(profile) => {
            println!("- Results released");
            render_profile(&profile);
        }
        Err(err) => println!("  Submit rejected: {err}"),
    }
    Ok(())
}

const DEMO_PASSWORD: &str = "Study2day!";

fn demo_lead(mismatch_confirmation: bool) -> Vec<LeadEdit> {
    let confirmation = if mismatch_confirmation {
        "Study2dya!"
    } else {
        DEMO_PASSWORD
    };
    vec![
        LeadEdit::Name("Avery Morgan".to_string()),
        LeadEdit::Email("avery.morgan@example.edu".to_string()),
        LeadEdit::Phone("(555) 014-2290".to_string()),
        LeadEdit::Password(DEMO_PASSWORD.to_string()),
        LeadEdit::ConfirmPassword(confirmation.to_string()),
        LeadEdit::AgreeToTerms(true),
    ]
}

fn render_profile(profile: &ScoreProfile) {
    println!(
        "  {} profile | {}/{} questions answered",
        profile.assessment_type, profile.answered, profile.total_questions
    );
    let dominant = profile.dominant_labels().join(", ");
    if profile.is_tied() {
        println!("  Dominant (tied): {dominant}");
    } else {
        println!("  Dominant: {dominant}");
    }
    for entry in &profile.scores {
        println!(
            "    - {:<18} {:>3}% ({} of {})",
            entry.label, entry.normalized, entry.raw, entry.max
        );
    }
}
