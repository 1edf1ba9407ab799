//! Stage composition.

use crate::error::Error;
use crate::log::ToolLog;
use crate::stage::{StageContext, StageHandle, StageState, spawn_stage};

use super::{ArtifactSink, ArtifactStream, forward};

/// Present an already-wired chain of stages as one stage.
///
/// `first` is the input sink of the chain's first stage and `last` the
/// output stream of its final stage. Writes to the returned stage feed
/// `first`; closing its input closes `first`; everything `last` produces,
/// including a failure, comes out of the returned stage's output.
pub fn encapsulate(first: ArtifactSink, last: ArtifactStream, log: ToolLog) -> StageHandle {
    spawn_stage("pipeline", log, move |ctx| async move {
        let StageContext {
            input,
            output,
            state,
            ..
        } = ctx;

        let feed_state = state.clone();
        let feed = async move {
            let failure = first.clone();
            if let Err(e) = forward(input, first).await {
                // Pushed into the chain so it surfaces from `last` in order.
                failure.fail(e).await;
            }
            feed_state.advance(StageState::Collecting, StageState::Waiting);
        };

        let drain = async move {
            let mut last = last;
            while let Some(item) = last.next().await {
                let artifact = item?;
                state.advance(StageState::Collecting, StageState::Streaming);
                state.advance(StageState::Waiting, StageState::Streaming);
                output.send(artifact).await?;
            }
            Ok::<(), Error>(())
        };

        let ((), drained) = tokio::join!(feed, drain);
        drained
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;
    use crate::stage::{Stage, collect_input};
    use crate::stream::pipe;

    fn artifact(name: &str) -> Artifact {
        Artifact::from_relative("/src", name).unwrap()
    }

    /// Stage that buffers its input and emits it with a suffix appended.
    fn suffix_stage(suffix: &'static str) -> StageHandle {
        spawn_stage("suffix", ToolLog::default(), move |mut ctx| async move {
            let inputs = collect_input(&mut ctx.input).await?;
            for input in inputs {
                let name = format!("{}{}", input.relative().display(), suffix);
                ctx.output.send(Artifact::from_relative("/out", name)?).await?;
            }
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_composite_behaves_like_one_stage() {
        let (a_sink, a_stream) = suffix_stage(".a").into_parts();
        let (b_sink, b_stream) = suffix_stage(".b").into_parts();
        pipe(a_stream, b_sink);

        let composite = encapsulate(a_sink, b_stream, ToolLog::default());
        let state = composite.watch_state();
        let outputs = composite
            .run(vec![artifact("X"), artifact("Y")])
            .await
            .unwrap();

        let names: Vec<_> = outputs
            .iter()
            .map(|a| a.relative().display().to_string())
            .collect();
        assert_eq!(names, vec!["X.a.b", "Y.a.b"]);
        assert_eq!(*state.borrow(), StageState::Done);
    }

    #[tokio::test]
    async fn test_composite_input_failure_reaches_output() {
        let (a_sink, a_stream) = suffix_stage(".a").into_parts();
        let (b_sink, b_stream) = suffix_stage(".b").into_parts();
        pipe(a_stream, b_sink);

        let (sink, stream) = encapsulate(a_sink, b_stream, ToolLog::default()).into_parts();
        sink.send(artifact("X")).await.unwrap();
        sink.fail(Error::LateAttachment).await;

        let err = stream.collect_all().await.unwrap_err();
        assert!(matches!(err, Error::LateAttachment));
    }
}
