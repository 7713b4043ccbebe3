use anyhow::{anyhow, bail, Context, Result};
use glam::{Vec3, Vec4};
use roxmltree::{Document, Node};

use crate::lighting::{Lamp, Lighting};
use crate::material::{LitMaterial, Material};
use crate::transform::{ModelTransform, TransformOp};
use crate::uniforms::{self, FrameRecorder, ShadingModel, UniformError, UniformSink};

const BEDROOM_XML: &str = include_str!("scenes/bedroom.xml");
const FLAT_ROOM_XML: &str = include_str!("scenes/flat_room.xml");

/// Static room description drawn with the shared cube.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub shading: ShadingModel,
    pub elements: Vec<SceneElement>,
}

/// One draw of the shared cube.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub name: String,
    pub group: String,
    pub transform: ModelTransform,
    pub material: Material,
    /// Lamp whose switch gates this element's emission.
    pub lamp: Option<Lamp>,
}

impl Scene {
    /// The lit bedroom with both switchable lamps.
    pub fn bedroom() -> Result<Self> {
        Self::from_xml(BEDROOM_XML).context("embedded bedroom scene is invalid")
    }

    /// The flat-colored room, transforms kept exactly as first authored.
    pub fn flat_room() -> Result<Self> {
        Self::from_xml(FLAT_ROOM_XML).context("embedded flat room scene is invalid")
    }

    pub fn for_shading(shading: ShadingModel) -> Result<Self> {
        match shading {
            ShadingModel::Flat => Self::flat_room(),
            ShadingModel::Lit => Self::bedroom(),
        }
    }

    /// Parses a scene document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            bail!("expected <scene> root, found <{}>", root.tag_name().name());
        }
        let shading = match root.attribute("shading") {
            Some(value) => ShadingModel::parse(value)
                .ok_or_else(|| anyhow!("unknown shading model `{value}`"))?,
            None => ShadingModel::Flat,
        };

        let mut elements = Vec::new();
        for (index, node) in root
            .descendants()
            .filter(|n| n.has_tag_name("element"))
            .enumerate()
        {
            let element = parse_element(&node, shading)
                .with_context(|| format!("scene element #{}", index + 1))?;
            elements.push(element);
        }

        Ok(Self { shading, elements })
    }

    /// Distinct group names in document order with their element counts.
    pub fn groups(&self) -> Vec<(&str, usize)> {
        let mut groups: Vec<(&str, usize)> = Vec::new();
        for element in &self.elements {
            match groups.iter_mut().find(|(name, _)| *name == element.group) {
                Some((_, count)) => *count += 1,
                None => groups.push((&element.group, 1)),
            }
        }
        groups
    }

    /// Pushes every element through the uniform protocol and draws it.
    ///
    /// The material is only re-sent when it differs from the previous draw.
    pub fn draw(&self, recorder: &mut FrameRecorder, lighting: &Lighting) -> Result<(), UniformError> {
        let mut previous: Option<(&Material, bool)> = None;
        for element in &self.elements {
            let emission_enabled = element.lamp.map_or(true, |lamp| lighting.is_on(lamp));
            recorder.set_mat4(uniforms::MODEL, element.transform.matrix())?;
            if previous != Some((&element.material, emission_enabled)) {
                element.material.apply(recorder, emission_enabled)?;
                previous = Some((&element.material, emission_enabled));
            }
            recorder.draw_cube();
        }
        Ok(())
    }
}

fn parse_element(node: &Node<'_, '_>, shading: ShadingModel) -> Result<SceneElement> {
    let name = node
        .attribute("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("element is missing a name"))?
        .to_string();
    let group = node
        .ancestors()
        .find(|ancestor| ancestor.has_tag_name("group"))
        .and_then(|group| group.attribute("name"))
        .unwrap_or("scene")
        .to_string();

    let transform = match child(node, "transform") {
        Some(transform) => parse_transform(&transform).with_context(|| format!("in `{name}`"))?,
        None => ModelTransform::new(),
    };

    let (material, lamp) = match shading {
        ShadingModel::Flat => {
            if child(node, "material").is_some() {
                bail!("`{name}` has a lit material in a flat scene");
            }
            let color = required_text(node, "color").with_context(|| format!("in `{name}`"))?;
            let color = parse_color(&color).with_context(|| format!("color of `{name}`"))?;
            (Material::Flat(color), None)
        }
        ShadingModel::Lit => {
            if child(node, "color").is_some() {
                bail!("`{name}` has a flat color in a lit scene");
            }
            let material = child(node, "material")
                .ok_or_else(|| anyhow!("<material> tag is missing in `{name}`"))?;
            let lamp = match material.attribute("lamp") {
                Some(value) => {
                    Some(Lamp::parse(value).ok_or_else(|| anyhow!("unknown lamp `{value}`"))?)
                }
                None => None,
            };
            let material =
                parse_material(&material).with_context(|| format!("material of `{name}`"))?;
            (Material::Lit(material), lamp)
        }
    };

    Ok(SceneElement {
        name,
        group,
        transform,
        material,
        lamp,
    })
}

fn parse_transform(node: &Node<'_, '_>) -> Result<ModelTransform> {
    let mut ops = Vec::new();
    for op in node.children().filter(Node::is_element) {
        let tag = op.tag_name().name();
        let op = match tag {
            "translate" => TransformOp::Translate(parse_vec3(text(&op))?),
            "scale" => TransformOp::Scale(parse_vec3(text(&op))?),
            "rotate" => {
                let axis = op
                    .attribute("axis")
                    .ok_or_else(|| anyhow!("<rotate> is missing an axis"))?;
                TransformOp::Rotate {
                    degrees: parse_f32(text(&op))?,
                    axis: parse_vec3(axis)?,
                }
            }
            "cube-fit" => TransformOp::CubeFit,
            other => bail!("unknown transform op <{other}>"),
        };
        ops.push(op);
    }
    Ok(ModelTransform::from_ops(ops))
}

fn parse_material(node: &Node<'_, '_>) -> Result<LitMaterial> {
    let ambient = parse_vec3(&required_text(node, "ambient")?)?;
    let diffuse = parse_vec3(&required_text(node, "diffuse")?)?;
    let mut material = LitMaterial::new(ambient, diffuse);
    if let Some(value) = optional_text(node, "specular") {
        material.specular = parse_vec3(&value)?;
    }
    if let Some(value) = optional_text(node, "emission") {
        material.emission = parse_vec3(&value)?;
    }
    if let Some(value) = optional_text(node, "shininess") {
        material.shininess = parse_f32(&value)?;
    }
    if let Some(value) = optional_text(node, "ka") {
        material.ka = parse_f32(&value)?;
    }
    if let Some(value) = optional_text(node, "kd") {
        material.kd = parse_f32(&value)?;
    }
    if let Some(value) = optional_text(node, "ks") {
        material.ks = parse_f32(&value)?;
    }
    Ok(material)
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn text<'a>(node: &Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_numbers(value: &str) -> Result<Vec<f32>> {
    value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid number `{component}`: {err}"))
        })
        .collect()
}

fn parse_vec3(value: &str) -> Result<Vec3> {
    match parse_numbers(value)?.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        other => Err(anyhow!("vector needs 3 components, found {}", other.len())),
    }
}

/// RGBA in `[0, 1]`; alpha defaults to opaque.
fn parse_color(value: &str) -> Result<Vec4> {
    match parse_numbers(value)?.as_slice() {
        [r, g, b] => Ok(Vec4::new(*r, *g, *b, 1.0)),
        [r, g, b, a] => Ok(Vec4::new(*r, *g, *b, *a)),
        other => Err(anyhow!("color needs 3 or 4 components, found {}", other.len())),
    }
}

fn parse_f32(value: &str) -> Result<f32> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|err| anyhow!("failed to parse float: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    const SAMPLE: &str = r#"
    <scene shading="lit">
        <group name="bed">
            <element name="frame">
                <transform>
                    <translate>1 0 0</translate>
                    <rotate axis="0 0 1">20</rotate>
                    <scale>2 0.5 1</scale>
                </transform>
                <material>
                    <ambient>0.1 0.1 0.1</ambient>
                    <diffuse>0.5 0.4 0.3</diffuse>
                    <shininess>8</shininess>
                </material>
            </element>
        </group>
        <element name="shade">
            <material lamp="night">
                <ambient>0.2 0.2 0.2</ambient>
                <diffuse>0.9 0.9 0.7</diffuse>
                <emission>1 1 0.8</emission>
            </material>
        </element>
    </scene>
    "#;

    #[test]
    fn parse_scene_populates_elements() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.shading, ShadingModel::Lit);
        assert_eq!(scene.elements.len(), 2);

        let frame = &scene.elements[0];
        assert_eq!(frame.group, "bed");
        assert_eq!(frame.transform.ops().len(), 3);
        assert_eq!(
            frame.transform.ops()[1],
            TransformOp::Rotate {
                degrees: 20.0,
                axis: Vec3::Z
            }
        );
        let Material::Lit(material) = frame.material else {
            panic!("expected lit material");
        };
        assert_eq!(material.shininess, 8.0);
        assert_eq!(material.specular, Vec3::ONE);

        let shade = &scene.elements[1];
        assert_eq!(shade.group, "scene");
        assert_eq!(shade.lamp, Some(Lamp::Night));
        assert_eq!(shade.transform.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn flat_scene_without_shading_attribute() {
        let xml = r#"<scene><element name="floor"><color>0 0 1</color></element></scene>"#;
        let scene = Scene::from_xml(xml).unwrap();
        assert_eq!(scene.shading, ShadingModel::Flat);
        assert_eq!(
            scene.elements[0].material,
            Material::Flat(Vec4::new(0.0, 0.0, 1.0, 1.0))
        );
    }

    #[test]
    fn mixed_materials_are_rejected() {
        let xml = r#"<scene shading="lit"><element name="wall"><color>1 1 1 1</color></element></scene>"#;
        assert!(Scene::from_xml(xml).is_err());
        let xml = r#"<scene><element name="wall"><material><ambient>1 1 1</ambient><diffuse>1 1 1</diffuse></material></element></scene>"#;
        assert!(Scene::from_xml(xml).is_err());
    }

    #[test]
    fn malformed_elements_are_errors() {
        let missing_name = "<scene><element><color>1 1 1</color></element></scene>";
        assert!(Scene::from_xml(missing_name).is_err());
        let short_vector = r#"<scene><element name="a"><transform><scale>1 2</scale></transform><color>1 1 1</color></element></scene>"#;
        assert!(Scene::from_xml(short_vector).is_err());
        let unknown_op = r#"<scene><element name="a"><transform><shear>1 2 3</shear></transform><color>1 1 1</color></element></scene>"#;
        let err = Scene::from_xml(unknown_op).unwrap_err();
        assert!(format!("{err:#}").contains("unknown transform op <shear>"));
    }

    #[test]
    fn embedded_scenes_parse() {
        let bedroom = Scene::bedroom().unwrap();
        assert_eq!(bedroom.shading, ShadingModel::Lit);
        let groups: Vec<&str> = bedroom.groups().into_iter().map(|(name, _)| name).collect();
        for expected in [
            "room",
            "bed",
            "wardrobe",
            "nightstand",
            "shelves",
            "mirror-table",
            "ceiling-lamp",
            "night-lamp",
        ] {
            assert!(groups.contains(&expected), "missing group {expected}");
        }
        assert!(bedroom.elements.iter().any(|e| e.lamp == Some(Lamp::Ceiling)));
        assert!(bedroom.elements.iter().any(|e| e.lamp == Some(Lamp::Night)));

        let flat = Scene::flat_room().unwrap();
        assert_eq!(flat.shading, ShadingModel::Flat);
        assert!(flat.elements.iter().all(|e| e.lamp.is_none()));
    }

    #[test]
    fn flat_room_keeps_scale_before_translate() {
        let flat = Scene::flat_room().unwrap();
        let floor = flat.elements.iter().find(|e| e.name == "floor").unwrap();
        assert!(matches!(
            floor.transform.ops(),
            [TransformOp::Scale(_), TransformOp::Translate(_), TransformOp::CubeFit]
        ));
    }

    #[test]
    fn draw_records_one_call_per_element() {
        let scene = Scene::bedroom().unwrap();
        let mut recorder = FrameRecorder::new(scene.shading);
        scene.draw(&mut recorder, &Lighting::default()).unwrap();
        assert_eq!(recorder.draws().len(), scene.elements.len());
        for (draw, element) in recorder.draws().iter().zip(&scene.elements) {
            assert_eq!(
                draw.constants.model,
                element.transform.matrix().to_cols_array_2d()
            );
        }
    }

    #[test]
    fn lamp_switch_gates_emission() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        let mut lighting = Lighting::default();

        let mut lit = FrameRecorder::new(scene.shading);
        scene.draw(&mut lit, &lighting).unwrap();
        assert_eq!(lit.draws()[1].constants.emission[..3], [1.0, 1.0, 0.8]);

        lighting.toggle(Lamp::Night);
        let mut dark = FrameRecorder::new(scene.shading);
        scene.draw(&mut dark, &lighting).unwrap();
        assert_eq!(dark.draws()[1].constants.emission[..3], [0.0, 0.0, 0.0]);
        assert_eq!(dark.draws()[0].constants.diffuse, lit.draws()[0].constants.diffuse);
    }

    #[test]
    fn drawing_into_wrong_shading_fails() {
        let scene = Scene::flat_room().unwrap();
        let mut recorder = FrameRecorder::new(ShadingModel::Lit);
        assert!(scene.draw(&mut recorder, &Lighting::default()).is_err());
    }
}
