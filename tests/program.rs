//! Whole programs in the surface syntax, parsed and executed end to end.

use std::io::Write;

use ink_reason::config::EngineConfig;
use ink_reason::engine::{Engine, ProgramOutcome};
use ink_reason::error::{LoadError, QueryError, SyntaxError};
use ink_reason::export::Snapshot;
use ink_reason::query::Answer;

fn execute(source: &str) -> (Engine, ProgramOutcome) {
    let mut engine = Engine::default();
    let program = engine.parse("<test>", source).unwrap();
    let outcome = engine.execute_program(program.into_statements()).unwrap();
    (engine, outcome)
}

/// The glyph printed for each query, in program order.
fn glyphs(outcome: &ProgramOutcome) -> Vec<&'static str> {
    outcome
        .answers
        .iter()
        .map(|q| q.result.as_ref().map_or("!", |a| a.glyph()))
        .collect()
}

#[test]
fn chained_propositions() {
    let (_, outcome) = execute("若A則B\n若B則C\n曰A\n問C乎");
    assert_eq!(glyphs(&outcome), vec!["⊤"]);
}

#[test]
fn classification_chain() {
    let (_, outcome) = execute("A者B也\nC者A也\n問C者B也乎");
    assert_eq!(glyphs(&outcome), vec!["⊤"]);
}

#[test]
fn conjunction_of_propositions() {
    let (_, outcome) = execute("以喜歡為動\n曰下雨\n曰週末\n若下雨且週末則在家\n問在家乎");
    assert_eq!(glyphs(&outcome), vec!["⊤"]);
}

#[test]
fn conjunction_needs_every_premise() {
    let (_, outcome) = execute("曰下雨\n若下雨且週末則在家\n問在家乎");
    assert_eq!(glyphs(&outcome), vec!["?"]);
}

#[test]
fn unknown_is_not_false() {
    let (_, outcome) = execute("曰A\n問B乎");
    assert_eq!(glyphs(&outcome), vec!["?"]);
}

#[test]
fn several_queries_answer_in_order() {
    let (_, outcome) = execute("曰A\n曰B\n問A乎\n問B乎\n問C乎");
    assert_eq!(glyphs(&outcome), vec!["⊤", "⊤", "?"]);
    let indices: Vec<usize> = outcome.answers.iter().map(|q| q.index).collect();
    assert_eq!(indices, vec![2, 3, 4]);
}

#[test]
fn rule_over_closed_classification() {
    let source = "以是為動\n哺乳類者生物也\n貓者哺乳類也\n若其X者生物也則其X是活的\n問貓是活的乎";
    let (_, outcome) = execute(source);
    assert_eq!(glyphs(&outcome), vec!["⊤"]);
    assert!(outcome.report.closure_edges >= 1);
}

#[test]
fn love_implies_respect() {
    let source = "\
以愛為動
以敬為動
孔子愛顏回
若其甲愛其乙則其乙敬其甲
問顏回敬孔子乎
問孔子敬顏回乎
";
    let (_, outcome) = execute(source);
    assert_eq!(glyphs(&outcome), vec!["⊤", "?"]);
}

#[test]
fn queries_see_the_whole_program() {
    // The query precedes the statements it depends on.
    let (_, outcome) = execute("問C乎\n曰A\n若A則C");
    assert_eq!(glyphs(&outcome), vec!["⊤"]);
}

#[test]
fn variable_query_is_reported_not_answered() {
    let (mut engine, outcome) = execute("以喜歡為動\n小明喜歡蘋果\n問其X喜歡蘋果乎");
    let [query] = outcome.answers.as_slice() else {
        panic!("expected one query");
    };
    assert!(matches!(
        query.result,
        Err(QueryError::VariableInQuery { .. })
    ));

    let solutions = engine.solutions(&query.pattern).unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0].render(engine.symbols()), "?其X = 小明");
}

#[test]
fn undeclared_verb_is_rejected_and_the_rest_still_runs() {
    let source = "\
以愛為動
孔子 惡 顏回
孔子愛顏回
問孔子愛顏回乎
";
    let (engine, outcome) = execute(source);
    assert_eq!(outcome.rejected.len(), 1);
    let rejected = &outcome.rejected[0];
    assert_eq!(rejected.index, 1);
    assert!(matches!(
        rejected.error,
        LoadError::UndeclaredVerb { ref verb, .. } if verb == "惡"
    ));
    assert_eq!(engine.kb().facts().len(), 1);
    assert_eq!(glyphs(&outcome), vec!["⊤"]);
}

#[test]
fn unbound_conclusion_variable_is_rejected() {
    let (engine, outcome) = execute("以愛為動\n若其甲愛其乙則其丙愛其甲");
    assert_eq!(outcome.rejected.len(), 1);
    assert!(matches!(
        outcome.rejected[0].error,
        LoadError::UnboundConclusionVariable { ref variable, .. } if variable == "?其丙"
    ));
    assert!(engine.kb().rules().is_empty());
}

#[test]
fn multiple_statements_on_one_line() {
    let (_, outcome) = execute("曰A 曰B 問A乎 問B乎");
    assert_eq!(glyphs(&outcome), vec!["⊤", "⊤"]);
}

#[test]
fn empty_program_does_nothing() {
    let (engine, outcome) = execute("");
    assert!(outcome.answers.is_empty());
    assert!(outcome.rejected.is_empty());
    assert!(engine.kb().view().is_empty());
}

#[test]
fn syntax_error_reports_a_line() {
    let engine = Engine::default();
    let err = engine.parse("<test>", "曰A\n孔子愛顏回\n").unwrap_err();
    assert!(matches!(err, SyntaxError::NoVerb { line: 2, .. }));
}

#[test]
fn program_file_and_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    let config_path = dir.path().join("ink.toml");
    std::fs::write(
        &config_path,
        "log_filter = \"debug\"\n\n[fixpoint]\nparallel = false\nmax_rounds = 16\n",
    )
    .unwrap();
    let config = EngineConfig::load(&config_path).unwrap();
    assert!(!config.fixpoint.parallel);
    assert_eq!(config.fixpoint.max_rounds, Some(16));

    let program_path = dir.path().join("sages.ink");
    let mut file = std::fs::File::create(&program_path).unwrap();
    writeln!(file, "＃ sages").unwrap();
    writeln!(file, "孔子者聖人也").unwrap();
    writeln!(file, "聖人者人也").unwrap();
    writeln!(file, "問孔子者人也乎").unwrap();
    drop(file);

    let source = std::fs::read_to_string(&program_path).unwrap();
    let mut engine = Engine::new(config);
    let name = program_path.display().to_string();
    let program = engine.parse(&name, &source).unwrap();
    let outcome = engine.execute_program(program.into_statements()).unwrap();
    assert_eq!(
        outcome.answers[0].result.as_ref().ok(),
        Some(&Answer::Proven)
    );

    let snapshot = Snapshot::capture(engine.kb());
    assert!(snapshot.converged);
    assert_eq!(snapshot.classifications.len(), 3);
    assert_eq!(snapshot.provenance.len(), 1);
    assert_eq!(snapshot.provenance[0].derived_by, "closure");
}
