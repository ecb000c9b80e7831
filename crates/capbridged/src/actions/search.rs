//! Reverse lookups from shaders and resources to the draws that use them.

use serde::Serialize;

use super::model::{Action, ActionFlag};
use crate::provider::{CaptureProvider, EventBindings, ProviderError, ResourceId, ShaderStage};

/// What a reverse lookup searches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Shader debug name or entry point, matched case-insensitively.
    Shader {
        /// Text to look for.
        needle: String,
        /// Restrict the search to one stage.
        stage: Option<ShaderStage>,
    },
    /// Bound resource name, matched case-insensitively.
    Texture {
        /// Text to look for.
        needle: String,
    },
    /// Exact resource id anywhere in the bindings.
    Resource {
        /// Resource to look for.
        resource_id: ResourceId,
    },
}

impl SearchQuery {
    /// Builds a shader query.
    #[must_use]
    pub fn shader(needle: &str, stage: Option<ShaderStage>) -> Self {
        Self::Shader {
            needle: needle.to_lowercase(),
            stage,
        }
    }

    /// Builds a texture name query.
    #[must_use]
    pub fn texture(needle: &str) -> Self {
        Self::Texture {
            needle: needle.to_lowercase(),
        }
    }
}

/// One event whose bindings satisfied the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// Event id of the draw or dispatch.
    pub event_id: u32,
    /// Action name.
    pub name: String,
    /// First binding that matched.
    pub match_reason: String,
}

/// Result of the `find_draws_by_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    /// Matches in execution order.
    pub matches: Vec<SearchMatch>,
    /// Number of matches.
    pub count: usize,
}

/// Draw and dispatch leaves of `forest` in execution order.
fn searchable(forest: &[Action], out: &mut Vec<(u32, String)>) {
    for action in forest {
        if !action.is_marker()
            && (action.has_flag(ActionFlag::Drawcall) || action.has_flag(ActionFlag::Dispatch))
        {
            out.push((action.event_id, action.name.clone()));
        }
        searchable(&action.children, out);
    }
}

/// Runs `query` against every draw and dispatch in the loaded capture.
///
/// # Errors
///
/// Propagates provider failures, including [`ProviderError::NoCaptureLoaded`].
pub fn find_draws(
    provider: &mut dyn CaptureProvider,
    query: &SearchQuery,
) -> Result<SearchResults, ProviderError> {
    let mut candidates = Vec::new();
    searchable(provider.actions()?, &mut candidates);

    let mut matches = Vec::new();
    for (event_id, name) in candidates {
        let bindings = provider.bindings(event_id)?;
        if let Some(match_reason) = match_reason(&*provider, &bindings, query) {
            matches.push(SearchMatch {
                event_id,
                name,
                match_reason,
            });
        }
    }
    Ok(SearchResults {
        count: matches.len(),
        matches,
    })
}

fn match_reason(
    provider: &dyn CaptureProvider,
    bindings: &EventBindings,
    query: &SearchQuery,
) -> Option<String> {
    match query {
        SearchQuery::Shader { needle, stage } => bindings
            .shaders
            .iter()
            .filter(|shader| stage.is_none_or(|wanted| shader.stage == wanted))
            .find_map(|shader| {
                if shader.name.to_lowercase().contains(needle.as_str()) {
                    Some(format!("{} shader name '{}' matches", shader.stage, shader.name))
                } else if shader.entry_point.to_lowercase().contains(needle.as_str()) {
                    Some(format!(
                        "{} shader entry point '{}' matches",
                        shader.stage, shader.entry_point
                    ))
                } else {
                    None
                }
            }),
        SearchQuery::Texture { needle } => {
            let named = |name: &str| name.to_lowercase().contains(needle.as_str());
            bindings
                .shaders
                .iter()
                .find_map(|shader| {
                    let read_only = shader
                        .read_only
                        .iter()
                        .find(|bound| named(&bound.name))
                        .map(|bound| {
                            format!("{} read-only resource '{}' matches", shader.stage, bound.name)
                        });
                    read_only.or_else(|| {
                        shader
                            .read_write
                            .iter()
                            .find(|bound| named(&bound.name))
                            .map(|bound| {
                                format!(
                                    "{} read-write resource '{}' matches",
                                    shader.stage, bound.name
                                )
                            })
                    })
                })
                .or_else(|| {
                    bindings.render_targets.iter().find_map(|target| {
                        provider
                            .resource_name(target.resource_id)
                            .filter(|name| named(name))
                            .map(|name| format!("render target {} '{name}' matches", target.index))
                    })
                })
        }
        SearchQuery::Resource { resource_id } => resource_reason(bindings, *resource_id),
    }
}

fn resource_reason(bindings: &EventBindings, wanted: ResourceId) -> Option<String> {
    for shader in &bindings.shaders {
        if shader.resource_id == wanted {
            return Some(format!("bound as {} shader", shader.stage));
        }
        if let Some(bound) = shader.read_only.iter().find(|b| b.resource_id == wanted) {
            return Some(format!(
                "{} read-only slot {} '{}'",
                shader.stage, bound.slot, bound.name
            ));
        }
        if let Some(bound) = shader.read_write.iter().find(|b| b.resource_id == wanted) {
            return Some(format!(
                "{} read-write slot {} '{}'",
                shader.stage, bound.slot, bound.name
            ));
        }
    }
    if let Some(target) = bindings
        .render_targets
        .iter()
        .find(|target| target.resource_id == wanted)
    {
        return Some(format!("render target {}", target.index));
    }
    (bindings.depth_target == Some(wanted)).then(|| "depth target".to_owned())
}
