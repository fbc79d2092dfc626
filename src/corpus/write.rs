//! Rewrites documents with new negation frames.
//!
//! The input is streamed through unchanged except for the semantics layer: existing `<splitwords>` and
//! negation frames are removed, the frames of the corresponding [Sentence] are inserted instead.
//! Frames with other names are kept.

use std::{
    collections::HashMap,
    io::{Read, Write},
};
use xml::{
    attribute::OwnedAttribute,
    reader::{EventReader, XmlEvent as ReadEvent},
    writer::{EmitterConfig, EventWriter, XmlEvent},
};

use super::read::is_negation_frame;
use crate::{
    frame::{Frame, SplitWord},
    types::{Document, Sentence},
    Error,
};

/// Names of the frame elements with the index used in their id.
const FOCUS: (&str, usize) = ("Focus", 1);
const NEGATED: (&str, usize) = ("Negated", 2);
const SCOPE: (&str, usize) = ("Scope", 3);

fn attribute<'a>(attributes: &'a [OwnedAttribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|x| x.name.local_name == name)
        .map(|x| x.value.as_str())
}

fn write_splitwords<W: Write>(
    writer: &mut EventWriter<W>,
    splits: &[SplitWord],
) -> Result<(), Error> {
    if splits.is_empty() {
        return Ok(());
    }

    writer.write(XmlEvent::start_element("splitwords"))?;
    for split in splits {
        writer.write(XmlEvent::start_element("splitword").attr("idref", split.token()))?;
        for part in split.parts() {
            writer.write(
                XmlEvent::start_element("part")
                    .attr("id", &part.id)
                    .attr("word", &part.word),
            )?;
            writer.write(XmlEvent::end_element())?;
        }
        writer.write(XmlEvent::end_element())?;
    }
    writer.write(XmlEvent::end_element())?;

    Ok(())
}

fn write_fenode<W: Write>(
    writer: &mut EventWriter<W>,
    idref: &str,
    is_split: bool,
) -> Result<(), Error> {
    let mut element = XmlEvent::start_element("fenode").attr("idref", idref);
    if is_split {
        element = element.attr("is_split", "yes");
    }

    writer.write(element)?;
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

/// Writes token references. The host of a split word is referenced through `part` instead.
fn write_fenodes<'a, W, I>(
    writer: &mut EventWriter<W>,
    tokens: I,
    split: Option<(&str, &str)>,
) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = &'a String>,
{
    for token in tokens {
        match split {
            Some((host, part)) if host == token.as_str() => write_fenode(writer, part, true)?,
            _ => write_fenode(writer, token, false)?,
        }
    }

    Ok(())
}

fn write_frame<W: Write>(writer: &mut EventWriter<W>, frame: &Frame) -> Result<(), Error> {
    let id = frame.id();
    let split = frame.split();

    let affix = split.and_then(|x| x.affix().map(|part| (x.token(), part.id.as_str())));
    let stem = split.and_then(|x| x.stem().map(|part| (x.token(), part.id.as_str())));

    writer.write(
        XmlEvent::start_element("frame")
            .attr("name", "Negation")
            .attr("id", id.as_str()),
    )?;

    writer.write(XmlEvent::start_element("target"))?;
    write_fenodes(writer, frame.target(), affix)?;
    writer.write(XmlEvent::end_element())?;

    for ((name, index), tokens) in [
        (FOCUS, frame.focus()),
        (NEGATED, frame.negated()),
        (SCOPE, frame.scope()),
    ]
    .iter()
    {
        let element_id = id.element(*index);

        writer.write(
            XmlEvent::start_element("fe")
                .attr("name", name)
                .attr("id", &element_id),
        )?;
        write_fenodes(writer, *tokens, stem)?;
        writer.write(XmlEvent::end_element())?;
    }

    writer.write(XmlEvent::end_element())?;
    Ok(())
}

fn write_frames<W: Write>(writer: &mut EventWriter<W>, frames: &[Frame]) -> Result<(), Error> {
    for frame in frames {
        write_frame(writer, frame)?;
    }
    Ok(())
}

/// What has been written for the current sentence.
#[derive(Default)]
struct Progress {
    sem: bool,
    frames: bool,
}

/// Streams `source` to `out`, dropping negation annotations and inserting the ones `lookup` returns per sentence id.
fn rewrite<'d, R, W, F>(source: R, out: W, lookup: F) -> Result<(), Error>
where
    R: Read,
    W: Write,
    F: Fn(&str) -> Option<&'d Sentence>,
{
    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .create_writer(out);

    let mut parents: Vec<String> = Vec::new();
    let mut sentence: Option<&Sentence> = None;
    let mut progress = Progress::default();
    let mut skipping = 0usize;

    for event in EventReader::new(source) {
        let event = event?;

        if skipping > 0 {
            match event {
                ReadEvent::StartElement { .. } => skipping += 1,
                ReadEvent::EndElement { .. } => skipping -= 1,
                _ => {}
            }
            continue;
        }

        match &event {
            ReadEvent::StartElement {
                name, attributes, ..
            } => {
                let local = name.local_name.as_str();
                let in_frames = parents.last().map_or(false, |x| x == "frames");

                if local == "splitwords"
                    || (local == "frame"
                        && in_frames
                        && is_negation_frame(attribute(attributes, "name").unwrap_or("")))
                {
                    skipping = 1;
                    continue;
                }

                if local == "s" {
                    sentence = attribute(attributes, "id").and_then(|x| lookup(x));
                    progress = Progress::default();
                }

                if let Some(writer_event) = event.as_writer_event() {
                    writer.write(writer_event)?;
                }
                parents.push(local.to_string());

                if local == "sem" {
                    progress.sem = true;
                    if let Some(sentence) = sentence {
                        write_splitwords(&mut writer, sentence.splits())?;
                    }
                }
            }
            ReadEvent::EndElement { name } => {
                let frames = sentence.map_or(&[][..], |x| x.frames());

                match name.local_name.as_str() {
                    "frames" if !progress.frames => {
                        write_frames(&mut writer, frames)?;
                        progress.frames = true;
                    }
                    "sem" if !progress.frames && !frames.is_empty() => {
                        writer.write(XmlEvent::start_element("frames"))?;
                        write_frames(&mut writer, frames)?;
                        writer.write(XmlEvent::end_element())?;
                        progress.frames = true;
                    }
                    "s" if !progress.sem && !frames.is_empty() => {
                        writer.write(XmlEvent::start_element("sem"))?;
                        if let Some(sentence) = sentence {
                            write_splitwords(&mut writer, sentence.splits())?;
                        }
                        writer.write(XmlEvent::start_element("frames"))?;
                        write_frames(&mut writer, frames)?;
                        writer.write(XmlEvent::end_element())?;
                        writer.write(XmlEvent::end_element())?;
                    }
                    _ => {}
                }

                if name.local_name == "s" {
                    sentence = None;
                }

                writer.write(XmlEvent::end_element())?;
                parents.pop();
            }
            // processing instructions break the writer, whitespace is re-created by indentation
            ReadEvent::ProcessingInstruction { .. } | ReadEvent::Whitespace(_) => {}
            _ => {
                if let Some(writer_event) = event.as_writer_event() {
                    writer.write(writer_event)?;
                }
            }
        }
    }

    Ok(())
}

/// Writes `source` to `out` with the negation frames of `document`. Sentences are matched by id,
/// sentences unknown to `document` lose their negation frames.
pub fn write_document<R: Read, W: Write>(
    source: R,
    document: &Document,
    out: W,
) -> Result<(), Error> {
    let sentences: HashMap<&str, &Sentence> =
        document.sentences().iter().map(|x| (x.id(), x)).collect();

    rewrite(source, out, |id| sentences.get(id).copied())
}

/// Writes `source` to `out` without split words and negation frames.
pub fn strip_frames<R: Read, W: Write>(source: R, out: W) -> Result<(), Error> {
    rewrite(source, out, |_| None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        corpus::parse_document,
        frame::{FrameId, SplitWord},
    };

    const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<corpus>
  <s id="s1">
    <graph root="s1_2">
      <terminals>
        <t id="s1_1" word="unklar" lemma="unklar" pos="ADJD" head="s1_2" deprel="PD"/>
        <t id="s1_2" word="bleibt" lemma="bleiben" pos="VVFIN"/>
      </terminals>
    </graph>
    <sem>
      <splitwords>
        <splitword idref="s1_1"><part id="s1_1_s0" word="un"/><part id="s1_1_s1" word="klar"/></splitword>
      </splitwords>
      <frames>
        <frame name="Negation" id="s1_f1"><target><fenode idref="s1_2"/></target></frame>
        <frame name="Motion" id="s1_f2"><target><fenode idref="s1_2"/></target></frame>
      </frames>
    </sem>
  </s>
  <s id="s2">
    <graph root="s2_1">
      <terminals>
        <t id="s2_1" word="nie" lemma="nie" pos="ADV"/>
      </terminals>
    </graph>
  </s>
</corpus>"#;

    fn annotated() -> Document {
        let mut document = parse_document("doc", SOURCE).unwrap();

        let affix = Frame::new(FrameId::nth("s1", 0), vec!["s1_1"])
            .with_focus(vec!["s1_1"])
            .with_negated(vec!["s1_1"])
            .with_scope(vec!["s1_1"])
            .with_split(SplitWord::new("s1_1", "un", "klar", true));
        document.sentences_mut()[0].set_frames(vec![affix]);

        let simple = Frame::new(FrameId::nth("s2", 0), vec!["s2_1"]).with_scope(vec!["s2_1"]);
        document.sentences_mut()[1].set_frames(vec![simple]);

        document
    }

    fn write(document: &Document) -> String {
        let mut out = Vec::new();
        write_document(SOURCE.as_bytes(), document, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn replaces_negation_frames() {
        let document = annotated();
        let xml = write(&document);

        assert!(xml.contains(r#"<frame name="Motion" id="s1_f2">"#));
        assert_eq!(xml.matches("<splitwords>").count(), 1);
        assert!(xml.contains(r#"idref="s1_1_s0" is_split="yes""#));
        assert!(xml.contains(r#"<fe name="Scope" id="s1_f1_e3">"#));

        let reread = parse_document("doc", &xml).unwrap();
        assert_eq!(reread.sentences()[0].frames(), document.sentences()[0].frames());
        assert_eq!(reread.sentences()[1].frames(), document.sentences()[1].frames());
    }

    #[test]
    fn strips_negation_frames() {
        let mut out = Vec::new();
        strip_frames(SOURCE.as_bytes(), &mut out).unwrap();
        let xml = String::from_utf8(out).unwrap();

        assert!(!xml.contains("splitwords"));
        assert!(!xml.contains(r#"name="Negation""#));
        assert!(xml.contains(r#"name="Motion""#));

        let reread = parse_document("doc", &xml).unwrap();
        assert_eq!(reread.frames().count(), 0);
        assert_eq!(reread.sentences().len(), 2);
    }
}
