use crate::{ResourceEffect, ResourceMsg, ResourceState};

/// Pure update function: applies a message to a resource slot and returns the
/// effects the driver has to carry out.
pub fn update_resource<T: Clone>(
    mut state: ResourceState<T>,
    msg: ResourceMsg<T>,
) -> (ResourceState<T>, Vec<ResourceEffect>) {
    if state.is_torn_down() {
        return (state, Vec::new());
    }

    let effects = match msg {
        ResourceMsg::Bind(deps) => {
            if state.dependencies().is_some() {
                return update_resource(state, ResourceMsg::DependenciesChanged(deps));
            }
            state.set_dependencies(deps);
            evaluate(&mut state)
        }
        ResourceMsg::DependenciesChanged(deps) => {
            if state.dependencies() == Some(&deps) {
                return (state, Vec::new());
            }
            state.set_dependencies(deps);
            evaluate(&mut state)
        }
        ResourceMsg::Refetch => evaluate(&mut state),
        ResourceMsg::Settled {
            generation,
            outcome,
        } => {
            if !state.accepts(generation) {
                return (state, Vec::new());
            }
            match outcome {
                Ok(value) => state.commit_success(value),
                Err(failure) => state.commit_failure(failure.normalized_message()),
            }
            Vec::new()
        }
        ResourceMsg::Reset => {
            state.reset_data();
            Vec::new()
        }
        ResourceMsg::Teardown => state
            .tear_down()
            .map(|generation| ResourceEffect::Cancel { generation })
            .into_iter()
            .collect(),
    };

    (state, effects)
}

fn evaluate<T>(state: &mut ResourceState<T>) -> Vec<ResourceEffect> {
    let (generation, superseded) = state.begin_evaluation();
    let mut effects = Vec::with_capacity(2);
    if let Some(stale) = superseded {
        effects.push(ResourceEffect::Cancel { generation: stale });
    }
    effects.push(ResourceEffect::Invoke { generation });
    effects
}
