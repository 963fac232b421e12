//! Animation translation: samplers and channels become interpolator and
//! timer nodes wired to DEF'ed transform fields by routes.

use std::collections::HashMap;

use xmltree::Element;

use crate::dom;
use crate::sink::{ContentSink, FieldValue, RouteSink};

use super::error::ColladaError;
use super::input::{self, SharedInput};
use super::source::{Source, SourceData};
use super::strings as s;
use super::TranslationState;

/// A `<sampler>`: its id and input bindings.
#[derive(Debug)]
struct Sampler {
    inputs: Vec<SharedInput>,
}

/// A `<channel>`: sampler ref and animation target (`node_id/sid`).
#[derive(Debug)]
struct Channel {
    sampler: String,
    target: String,
}

/// Translate every animation in the document's `<library_animations>`.
///
/// Runs after the scene walk so the DEF'ed transform-field map is complete;
/// channels whose target was never DEF'ed are skipped.
pub fn translate_animations(
    root: &Element,
    sink: &mut dyn ContentSink,
    routes: &mut dyn RouteSink,
    state: &TranslationState,
) {
    for library in dom::find_children(root, s::LIBRARY_ANIMATIONS) {
        for animation in dom::find_children(library, s::ANIMATION) {
            translate_animation(animation, sink, routes, state);
        }
    }
}

fn translate_animation(
    animation: &Element,
    sink: &mut dyn ContentSink,
    routes: &mut dyn RouteSink,
    state: &TranslationState,
) {
    // Samplers, sources, and channels may sit in nested <animation>
    // elements; gather the whole subtree.
    let samplers: HashMap<String, Sampler> = dom::descendants(animation, s::SAMPLER)
        .into_iter()
        .filter_map(|e| {
            dom::attribute(e, s::ID).map(|id| {
                (
                    id.to_string(),
                    Sampler {
                        inputs: input::inputs(e),
                    },
                )
            })
        })
        .collect();

    let mut sources: HashMap<String, Source> = HashMap::new();
    for element in dom::descendants(animation, s::SOURCE) {
        match Source::parse(element) {
            Ok(source) => {
                sources.insert(source.id.clone(), source);
            }
            Err(err) => log::warn!("skipping malformed animation source: {}", err),
        }
    }

    let channels: Vec<Channel> = dom::descendants(animation, s::CHANNEL)
        .into_iter()
        .filter_map(|e| {
            let sampler = dom::attribute(e, s::SOURCE).map(super::local_ref)?;
            let target = dom::attribute(e, s::TARGET)?;
            Some(Channel {
                sampler: sampler.to_string(),
                target: target.to_string(),
            })
        })
        .collect();

    for channel in &channels {
        let target_field = match state.def_fields.get(&channel.target) {
            Some(field) => field,
            None => {
                log::debug!("channel target '{}' has no DEF'ed field", channel.target);
                continue;
            }
        };
        if let Err(err) =
            translate_channel(channel, target_field, &samplers, &sources, sink, routes)
        {
            log::warn!("skipping channel to '{}': {}", channel.target, err);
        }
    }
}

fn translate_channel(
    channel: &Channel,
    target_field: &str,
    samplers: &HashMap<String, Sampler>,
    sources: &HashMap<String, Source>,
    sink: &mut dyn ContentSink,
    routes: &mut dyn RouteSink,
) -> Result<(), ColladaError> {
    let sampler = samplers
        .get(&channel.sampler)
        .ok_or_else(|| ColladaError::UnresolvedReference(channel.sampler.clone()))?;

    let input = sampler_source(sampler, s::SEM_INPUT)?;
    let output = sampler_source(sampler, s::SEM_OUTPUT)?;
    let interp = sampler_source(sampler, s::SEM_INTERPOLATION)?;

    let times = source_floats(sources, input)?;
    let values = source_floats(sources, output)?;
    if times.is_empty() {
        return Err(ColladaError::Structural(format!(
            "sampler '{}' has no keyframes",
            channel.sampler
        )));
    }

    let begin = times[0];
    let end = times[times.len() - 1];
    let cycle_interval = end - begin;
    if cycle_interval <= 0.0 {
        return Err(ColladaError::Structural(format!(
            "sampler '{}' spans no time",
            channel.sampler
        )));
    }
    // Keys are the sample times normalized by the curve's duration.
    let keys: Vec<f32> = times.iter().map(|t| t / cycle_interval).collect();

    // TODO: interpolator and timer DEF ids are the source ids, which are
    // only unique per animation; prefix with the animation id if a document
    // with colliding source ids ever shows up.
    sink.start_node("PositionInterpolator", Some(interp));
    sink.start_field("key");
    sink.field_value(FieldValue::Floats(keys));
    sink.end_field();
    sink.start_field("keyValue");
    sink.field_value(FieldValue::Floats(values));
    sink.end_field();
    sink.end_node();

    sink.start_node("TimeSensor", Some(input));
    sink.start_field("loop");
    sink.field_value(FieldValue::Bool(true));
    sink.end_field();
    sink.start_field("cycleInterval");
    sink.field_value(FieldValue::Time(f64::from(cycle_interval)));
    sink.end_field();
    sink.end_node();

    routes.route_decl(input, "fraction_changed", interp, "set_fraction");
    routes.route_decl(
        interp,
        "value_changed",
        &channel.target,
        &format!("{}_changed", target_field),
    );
    Ok(())
}

/// Source id bound to a sampler input semantic.
fn sampler_source<'a>(
    sampler: &'a Sampler,
    semantic: &'static str,
) -> Result<&'a str, ColladaError> {
    input::find_semantic(&sampler.inputs, semantic)
        .map(|i| i.source.as_str())
        .ok_or(ColladaError::MissingInput(semantic))
}

fn source_floats(
    sources: &HashMap<String, Source>,
    id: &str,
) -> Result<Vec<f32>, ColladaError> {
    let source = sources
        .get(id)
        .ok_or_else(|| ColladaError::UnresolvedReference(id.to_string()))?;
    match source.data()? {
        SourceData::Floats(values) => Ok(values),
        _ => Err(ColladaError::Structural(format!(
            "animation source '{}' is not a float buffer",
            id
        ))),
    }
}
