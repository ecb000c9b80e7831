//! Shader reflection and disassembly.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::provider::{
    BoundResource, BoundShader, CaptureProvider, ConstantBlock, ProviderError, ShaderStage,
};

const EMBEDDED_SOURCE_TARGET: &str = "embedded_source";

/// Picks the most readable disassembly target.
///
/// Cross-compiled GLSL wins, then any GLSL, then cross-compiled HLSL, then
/// any HLSL, then the first target that is not an IL or binary dump.
#[must_use]
pub fn pick_disassembly_target(targets: &[String]) -> Option<&str> {
    let lowered: Vec<(String, &str)> = targets
        .iter()
        .map(|target| (target.to_lowercase(), target.as_str()))
        .collect();
    let find = |accept: &dyn Fn(&str) -> bool| {
        lowered
            .iter()
            .find(|(lower, _)| accept(lower))
            .map(|(_, original)| *original)
    };
    let cross = |lower: &str| lower.contains("cross") || lower.contains("compil");

    find(&|lower| lower.contains("glsl") && cross(lower))
        .or_else(|| find(&|lower| lower.contains("glsl")))
        .or_else(|| find(&|lower| lower.contains("hlsl") && cross(lower)))
        .or_else(|| find(&|lower| lower.contains("hlsl")))
        .or_else(|| {
            find(&|lower| {
                !lower.contains("il") && !lower.contains("bytecode") && !lower.contains("binary")
            })
        })
        .or_else(|| targets.first().map(String::as_str))
}

/// Access mode of a reflected resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceAccess {
    /// Sampled or read-only resource.
    ReadOnly,
    /// Storage or unordered-access resource.
    ReadWrite,
}

/// A resource declared by a shader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReflectedResource {
    /// Declared name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Binding slot.
    pub binding: u32,
    /// Access mode.
    pub access: ResourceAccess,
}

/// Result of `get_shader_info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderInfo {
    /// Shader id.
    pub resource_id: String,
    /// Entry point name.
    pub entry_point: String,
    /// Stage queried.
    pub stage: ShaderStage,
    /// Targets the provider can disassemble to.
    pub disassembly_targets: Vec<String>,
    /// Target whose output is reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disassembly_target_used: Option<String>,
    /// Disassembly text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disassembly: Option<String>,
    /// Why disassembly failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disassembly_error: Option<String>,
    /// Source embedded in the capture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    /// Constant blocks.
    pub constant_buffers: Vec<ConstantBlock>,
    /// Read-only and read-write resources.
    pub resources: Vec<ReflectedResource>,
}

/// Result of `get_shader_source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShaderSource {
    /// Shader id.
    pub resource_id: String,
    /// Entry point name.
    pub entry_point: String,
    /// Stage queried.
    pub stage: ShaderStage,
    /// Targets the provider can disassemble to.
    pub available_targets: Vec<String>,
    /// Target whose output is reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Reported source text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    /// Why no source could be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Output of every target, keyed by target name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_sources: Option<BTreeMap<String, String>>,
}

fn bound_shader(
    provider: &mut dyn CaptureProvider,
    event_id: u32,
    stage: ShaderStage,
) -> Result<BoundShader, ProviderError> {
    let bindings = provider.bindings(event_id)?;
    bindings
        .shaders
        .into_iter()
        .find(|shader| shader.stage == stage)
        .ok_or(ProviderError::ShaderNotBound { stage })
}

fn reflected_resources(shader: &BoundShader) -> Vec<ReflectedResource> {
    let tagged = |access: ResourceAccess| {
        move |bound: &BoundResource| ReflectedResource {
            name: bound.name.clone(),
            type_name: bound.resource_type.clone(),
            binding: bound.slot,
            access,
        }
    };
    shader
        .read_only
        .iter()
        .map(tagged(ResourceAccess::ReadOnly))
        .chain(shader.read_write.iter().map(tagged(ResourceAccess::ReadWrite)))
        .collect()
}

/// Reflection and best-effort disassembly of the shader bound at `stage`.
///
/// # Errors
///
/// Fails when the event is unknown or no shader is bound at `stage`.
/// Disassembly failures are reported inside the result.
pub fn shader_info(
    provider: &mut dyn CaptureProvider,
    event_id: u32,
    stage: ShaderStage,
) -> Result<ShaderInfo, ProviderError> {
    let shader = bound_shader(provider, event_id, stage)?;
    let targets = provider.disassembly_targets(event_id, stage)?;

    let mut info = ShaderInfo {
        resource_id: shader.resource_id.to_string(),
        entry_point: shader.entry_point.clone(),
        stage,
        disassembly_targets: targets.clone(),
        disassembly_target_used: None,
        disassembly: None,
        disassembly_error: None,
        source_code: shader.embedded_source.clone(),
        resources: reflected_resources(&shader),
        constant_buffers: shader.constant_blocks,
    };
    if let Some(target) = pick_disassembly_target(&targets) {
        info.disassembly_target_used = Some(target.to_owned());
        match provider.disassemble(event_id, stage, target) {
            Ok(text) => info.disassembly = Some(text),
            Err(error) => info.disassembly_error = Some(error.to_string()),
        }
    }
    Ok(info)
}

/// Source text of the shader bound at `stage`.
///
/// # Errors
///
/// Fails when the event is unknown or no shader is bound at `stage`. A
/// requested target that does not exist is reported in the result.
pub fn shader_source(
    provider: &mut dyn CaptureProvider,
    event_id: u32,
    stage: ShaderStage,
    requested: Option<&str>,
) -> Result<ShaderSource, ProviderError> {
    let shader = bound_shader(provider, event_id, stage)?;
    let targets = provider.disassembly_targets(event_id, stage)?;

    let mut source = ShaderSource {
        resource_id: shader.resource_id.to_string(),
        entry_point: shader.entry_point,
        stage,
        available_targets: targets.clone(),
        target: None,
        source_code: None,
        error: None,
        all_sources: None,
    };

    if let Some(embedded) = shader.embedded_source {
        source.target = Some(EMBEDDED_SOURCE_TARGET.to_owned());
        source.source_code = Some(embedded);
        return Ok(source);
    }

    if let Some(wanted) = requested {
        let needle = wanted.to_lowercase();
        let Some(target) = targets
            .iter()
            .find(|target| target.to_lowercase().contains(&needle))
        else {
            source.error = Some(format!(
                "Target '{wanted}' not found. Available: {}",
                targets.join(", ")
            ));
            return Ok(source);
        };
        match provider.disassemble(event_id, stage, target) {
            Ok(text) => source.source_code = Some(text),
            Err(error) => source.error = Some(error.to_string()),
        }
        source.target = Some(target.clone());
        return Ok(source);
    }

    if targets.is_empty() {
        source.error = Some("No disassembly targets available".to_owned());
        return Ok(source);
    }

    let mut readable = Vec::new();
    let mut all_sources = BTreeMap::new();
    for target in &targets {
        match provider.disassemble(event_id, stage, target) {
            Ok(text) => {
                readable.push(target.clone());
                all_sources.insert(target.clone(), text);
            }
            Err(error) => {
                all_sources.insert(target.clone(), format!("[Error: {error}]"));
            }
        }
    }
    let best = pick_disassembly_target(&readable).map(str::to_owned);
    match best {
        Some(target) => {
            source.source_code = all_sources.get(&target).cloned();
            source.target = Some(target);
        }
        None => source.error = Some("Every disassembly target failed".to_owned()),
    }
    source.all_sources = Some(all_sources);
    Ok(source)
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::provider::SnapshotProvider;
    use crate::provider::snapshot::test_support::fixture_provider;

    #[fixture]
    fn provider() -> SnapshotProvider {
        fixture_provider()
    }

    fn owned(targets: &[&str]) -> Vec<String> {
        targets.iter().map(|target| (*target).to_owned()).collect()
    }

    #[rstest]
    #[case::cross_glsl(&["SPIR-V", "GLSL", "GLSL (SPIRV-Cross)"], Some("GLSL (SPIRV-Cross)"))]
    #[case::plain_glsl(&["HLSL (SPIRV-Cross)", "GLSL"], Some("GLSL"))]
    #[case::cross_hlsl(&["DXBC", "HLSL", "HLSL (Decompiled)"], Some("HLSL (Decompiled)"))]
    #[case::plain_hlsl(&["DXIL", "HLSL"], Some("HLSL"))]
    #[case::skips_il(&["AMD IL", "x86 bytecode", "SPIR-V (RenderDoc)"], Some("SPIR-V (RenderDoc)"))]
    #[case::falls_back_to_first(&["DXIL", "raw binary"], Some("DXIL"))]
    #[case::empty(&[], None)]
    fn target_ranking(#[case] targets: &[&str], #[case] expected: Option<&str>) {
        let targets = owned(targets);
        assert_eq!(pick_disassembly_target(&targets), expected);
    }

    #[rstest]
    fn info_uses_the_most_readable_target(mut provider: SnapshotProvider) {
        let info = shader_info(&mut provider, 21, ShaderStage::Pixel).expect("info");
        assert_eq!(info.resource_id, "ResourceId::102");
        assert_eq!(
            info.disassembly_target_used.as_deref(),
            Some("GLSL (SPIRV-Cross)")
        );
        assert!(info.disassembly.is_some_and(|text| text.contains("#version")));
        assert_eq!(info.constant_buffers.len(), 1);
        assert_eq!(info.resources.len(), 1);
        assert_eq!(info.resources[0].access, ResourceAccess::ReadOnly);
    }

    #[rstest]
    fn info_requires_a_bound_shader(mut provider: SnapshotProvider) {
        let error = shader_info(&mut provider, 11, ShaderStage::Pixel).expect_err("unbound");
        assert_eq!(error.to_string(), "No pixel shader bound");
    }

    #[rstest]
    fn embedded_source_wins(mut provider: SnapshotProvider) {
        let source =
            shader_source(&mut provider, 22, ShaderStage::Compute, Some("dxil")).expect("source");
        assert_eq!(source.target.as_deref(), Some(EMBEDDED_SOURCE_TARGET));
        assert!(source.source_code.is_some_and(|text| text.contains("cull_lights")));
        assert!(source.error.is_none());
    }

    #[rstest]
    fn explicit_targets_match_case_insensitively(mut provider: SnapshotProvider) {
        let source =
            shader_source(&mut provider, 21, ShaderStage::Pixel, Some("spir-v")).expect("source");
        assert_eq!(source.target.as_deref(), Some("SPIR-V (RenderDoc)"));
        assert!(source.all_sources.is_none());
    }

    #[rstest]
    fn unknown_targets_are_reported_in_the_result(mut provider: SnapshotProvider) {
        let source =
            shader_source(&mut provider, 21, ShaderStage::Pixel, Some("metal")).expect("source");
        assert!(source.source_code.is_none());
        assert_eq!(
            source.error.as_deref(),
            Some(
                "Target 'metal' not found. Available: SPIR-V (RenderDoc), GLSL (SPIRV-Cross), \
                 HLSL (SPIRV-Cross)"
            )
        );
    }

    #[rstest]
    fn without_a_target_every_output_is_collected(mut provider: SnapshotProvider) {
        let source = shader_source(&mut provider, 21, ShaderStage::Pixel, None).expect("source");
        assert_eq!(source.target.as_deref(), Some("GLSL (SPIRV-Cross)"));
        let all = source.all_sources.expect("all sources");
        assert_eq!(all.len(), 3);
        assert!(
            all.get("HLSL (SPIRV-Cross)")
                .is_some_and(|text| text.starts_with("[Error"))
        );
    }
}
