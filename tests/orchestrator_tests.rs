use intervox::dialogue::{
    DialogueResponse, InterviewState, Orchestrator, RandomTermination, Role, TerminationPolicy,
    TurnOutcome, COMPLETION_MESSAGE, FALLBACK_FOLLOW_UP, GREETING,
};
use intervox::error::TurnError;

/// Concludes after exactly `limit` answered questions
struct FixedBudget {
    limit: u32,
}

impl TerminationPolicy for FixedBudget {
    fn should_conclude(&mut self, answered_questions: u32) -> bool {
        answered_questions >= self.limit
    }
}

fn orchestrator_with_budget(limit: u32) -> Orchestrator {
    Orchestrator::with_termination("Software Engineer", "Backend", Box::new(FixedBudget { limit }))
}

fn follow_up(text: &str) -> DialogueResponse {
    DialogueResponse {
        follow_up_question: Some(text.to_string()),
        feedback: None,
    }
}

#[test]
fn open_seeds_the_greeting() {
    let mut orchestrator = orchestrator_with_budget(3);
    let greeting = orchestrator.open().unwrap();

    assert_eq!(greeting.role, Role::Interviewer);
    assert_eq!(greeting.text, GREETING);
    assert_eq!(orchestrator.state(), InterviewState::AwaitingAnswer);
}

#[test]
fn open_twice_is_rejected() {
    let mut orchestrator = orchestrator_with_budget(3);
    orchestrator.open().unwrap();
    assert!(matches!(
        orchestrator.open(),
        Err(TurnError::NotAwaiting { .. })
    ));
}

#[test]
fn empty_answer_is_ignored_without_state_change() {
    let mut orchestrator = orchestrator_with_budget(3);
    orchestrator.open().unwrap();

    assert!(matches!(
        orchestrator.begin_answer("   "),
        Err(TurnError::EmptyAnswer)
    ));
    assert_eq!(orchestrator.state(), InterviewState::AwaitingAnswer);
    assert_eq!(orchestrator.turns().len(), 1);
    assert_eq!(orchestrator.question_count(), 0);
}

#[test]
fn answer_before_open_is_rejected() {
    let mut orchestrator = orchestrator_with_budget(3);
    assert!(matches!(
        orchestrator.begin_answer("hello"),
        Err(TurnError::NotAwaiting { .. })
    ));
}

#[test]
fn first_answer_is_the_introduction() {
    let mut orchestrator = orchestrator_with_budget(3);
    orchestrator.open().unwrap();

    let request = orchestrator
        .begin_answer("I built a REST API using Node.js and Postgres, handling 10k requests/day.")
        .unwrap();
    assert!(request.is_introduction);
    assert!(request.generate_follow_up);
    assert_eq!(orchestrator.state(), InterviewState::Processing);

    orchestrator.complete_turn(follow_up("Tell me more.")).unwrap();
    assert_eq!(orchestrator.question_count(), 1);
    assert_eq!(orchestrator.state(), InterviewState::AwaitingAnswer);

    // Second answer is no longer the introduction
    let request = orchestrator.begin_answer("I used connection pooling.").unwrap();
    assert!(!request.is_introduction);
}

#[test]
fn reentrant_submission_is_rejected_while_processing() {
    let mut orchestrator = orchestrator_with_budget(3);
    orchestrator.open().unwrap();
    orchestrator.begin_answer("First answer.").unwrap();

    assert!(matches!(
        orchestrator.begin_answer("Second answer."),
        Err(TurnError::NotAwaiting {
            state: "processing"
        })
    ));
}

#[test]
fn turns_strictly_alternate_roles() {
    let mut orchestrator = orchestrator_with_budget(5);
    orchestrator.open().unwrap();

    for i in 0..4 {
        orchestrator
            .begin_answer(&format!("Answer number {}.", i))
            .unwrap();
        orchestrator
            .complete_turn(follow_up(&format!("Question number {}?", i)))
            .unwrap();
    }

    let turns = orchestrator.turns();
    assert_eq!(turns.len(), 9);
    for (i, turn) in turns.iter().enumerate() {
        let expected = if i % 2 == 0 {
            Role::Interviewer
        } else {
            Role::Candidate
        };
        assert_eq!(turn.role, expected, "turn {} has wrong role", i);
    }

    // Timestamps never go backwards
    for pair in turns.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[test]
fn missing_follow_up_uses_the_fallback_question() {
    let mut orchestrator = orchestrator_with_budget(3);
    orchestrator.open().unwrap();
    orchestrator.begin_answer("An answer.").unwrap();

    let outcome = orchestrator
        .complete_turn(DialogueResponse::default())
        .unwrap();
    match outcome {
        TurnOutcome::FollowUp(question) => assert_eq!(question, FALLBACK_FOLLOW_UP),
        other => panic!("expected follow-up, got {:?}", other),
    }
    assert_eq!(orchestrator.question_count(), 1);
}

#[test]
fn blank_follow_up_uses_the_fallback_question() {
    let mut orchestrator = orchestrator_with_budget(3);
    orchestrator.open().unwrap();
    orchestrator.begin_answer("An answer.").unwrap();

    let outcome = orchestrator.complete_turn(follow_up("   ")).unwrap();
    match outcome {
        TurnOutcome::FollowUp(question) => assert_eq!(question, FALLBACK_FOLLOW_UP),
        other => panic!("expected follow-up, got {:?}", other),
    }
}

#[test]
fn budget_reached_concludes_with_the_completion_message() {
    let mut orchestrator = orchestrator_with_budget(2);
    orchestrator.open().unwrap();

    orchestrator.begin_answer("First.").unwrap();
    let first = orchestrator.complete_turn(follow_up("Next?")).unwrap();
    assert!(matches!(first, TurnOutcome::FollowUp(_)));

    orchestrator.begin_answer("Second.").unwrap();
    let second = orchestrator.complete_turn(follow_up("Unused?")).unwrap();
    match second {
        TurnOutcome::Concluding(message) => assert_eq!(message, COMPLETION_MESSAGE),
        other => panic!("expected conclusion, got {:?}", other),
    }
    assert_eq!(orchestrator.state(), InterviewState::Concluding);

    // No further answers are accepted
    assert!(matches!(
        orchestrator.begin_answer("Third."),
        Err(TurnError::NotAwaiting { .. })
    ));
}

#[test]
fn random_policy_never_ends_before_minimum() {
    for seed in 0..20 {
        let mut policy = RandomTermination::seeded(10, 15, 0.3, seed);
        for count in 0..10 {
            assert!(
                !policy.should_conclude(count),
                "seed {} concluded at {}",
                seed,
                count
            );
        }
    }
}

#[test]
fn random_policy_always_ends_at_hard_cap() {
    for seed in 0..20 {
        let mut policy = RandomTermination::seeded(10, 15, 0.0, seed);
        assert!(policy.should_conclude(15), "seed {} did not cap", seed);
    }
}

#[test]
fn finish_records_final_feedback_and_completes() {
    let mut orchestrator = orchestrator_with_budget(1);
    orchestrator.open().unwrap();
    orchestrator.begin_answer("Only answer.").unwrap();
    orchestrator.complete_turn(follow_up("Unused?")).unwrap();
    assert_eq!(orchestrator.state(), InterviewState::Concluding);

    let feedback = intervox::dialogue::FinalFeedback {
        overall_score: 8.0,
        technical_assessment: "Solid".to_string(),
        communication_assessment: "Clear".to_string(),
        strengths: vec!["Depth".to_string()],
        improvements: vec!["Examples".to_string()],
        suggestions: vec!["Practice".to_string()],
        next_steps: "Keep going".to_string(),
    };
    orchestrator.finish(feedback).unwrap();

    assert_eq!(orchestrator.state(), InterviewState::Complete);
    assert_eq!(orchestrator.final_feedback().unwrap().overall_score, 8.0);
    assert!(matches!(
        orchestrator.begin_answer("Too late."),
        Err(TurnError::AlreadyComplete)
    ));
}

#[test]
fn exchanges_pair_questions_with_answers() {
    let mut orchestrator = orchestrator_with_budget(3);
    orchestrator.open().unwrap();

    orchestrator.begin_answer("My introduction.").unwrap();
    orchestrator.complete_turn(follow_up("About that project?")).unwrap();
    orchestrator.begin_answer("Project details.").unwrap();
    orchestrator.complete_turn(follow_up("And testing?")).unwrap();

    let exchanges = orchestrator.exchanges();
    assert_eq!(exchanges.len(), 2);
    assert_eq!(exchanges[0].question, GREETING);
    assert_eq!(exchanges[0].answer, "My introduction.");
    assert_eq!(exchanges[1].question, "About that project?");
    assert_eq!(exchanges[1].answer, "Project details.");

    assert_eq!(
        orchestrator.all_responses(),
        "My introduction. Project details."
    );
}
