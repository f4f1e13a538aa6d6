//! Example: Building a context diagram from a model
//!
//! Draws a component with its neighbours twice: once with ports, once
//! without, to show how the same exchange declarations bind either to the
//! ports or to the owning components.
//!
//! Run with `RUST_LOG=debug` to see registrations and endpoint fallbacks.

use contexture::{
    DiagramBuilder, Primitive, RenderedDiagram,
    config::RenderOptions,
    model::{Element, ElementKind, Model},
};

fn build_model() -> Result<Model, Box<dyn std::error::Error>> {
    let mut model = Model::new();
    let system = model.insert(Element::component("system", "Logical System"))?;
    let sensor = model.insert(Element::subcomponent("sensor", "Sensor", system))?;
    let controller = model.insert(Element::subcomponent("controller", "Controller", system))?;
    let actuator = model.insert(Element::subcomponent("actuator", "Actuator", system))?;

    let sensor_out = model.insert(Element::port("sensor-out", "Reading", sensor))?;
    let controller_in = model.insert(Element::port("controller-in", "Input", controller))?;
    let controller_out = model.insert(Element::port("controller-out", "Command", controller))?;
    let actuator_in = model.insert(Element::port("actuator-in", "Setpoint", actuator))?;

    model.insert(Element::exchange(
        "measurements",
        "Measurements",
        sensor_out,
        controller_in,
    ))?;
    model.insert(Element::exchange(
        "commands",
        "Commands",
        controller_out,
        actuator_in,
    ))?;
    Ok(model)
}

fn context_of(
    model: &Model,
    focus: &Element,
    with_ports: bool,
) -> Result<DiagramBuilder, Box<dyn std::error::Error>> {
    let mut diagram = DiagramBuilder::new(focus);
    diagram.add_box(focus, None)?;

    for exchange in model.iter() {
        let ElementKind::Exchange { .. } = exchange.kind() else {
            continue;
        };
        let (source, target) = model.ends_of(exchange).ok_or("dangling exchange")?;
        let (Some(source_owner), Some(target_owner)) =
            (model.owner_of(source), model.owner_of(target))
        else {
            continue;
        };
        if source_owner != focus && target_owner != focus {
            continue;
        }

        for (port, owner) in [(source, source_owner), (target, target_owner)] {
            diagram.add_box(owner, None)?;
            if with_ports {
                diagram.add_port(port, owner)?;
            }
        }
        diagram.add_edge(exchange, source, target)?;
    }

    Ok(diagram)
}

fn print_diagram(rendered: &RenderedDiagram) {
    println!("{} ({} elements)", rendered.name(), rendered.len());
    for (_, primitive) in rendered.iter() {
        match primitive {
            Primitive::Box(rendered_box) if rendered_box.is_port() => {}
            Primitive::Box(rendered_box) => {
                let ports: Vec<&str> = rendered
                    .ports_of(rendered_box.id())
                    .filter_map(|port| port.label())
                    .collect();
                println!(
                    "  [box]  {} ports: {:?}",
                    rendered_box.label().unwrap_or("?"),
                    ports
                );
            }
            Primitive::Edge(edge) => {
                let source = rendered.source_of(edge).and_then(|b| b.label());
                let target = rendered.target_of(edge).and_then(|b| b.label());
                println!(
                    "  [edge] {}: {} -> {}",
                    edge.label().unwrap_or("?"),
                    source.unwrap_or("?"),
                    target.unwrap_or("?")
                );
            }
        }
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let model = build_model()?;
    let controller = model.by_id("controller")?;
    let options = RenderOptions::new().with_style_class("context");

    let with_ports = context_of(&model, controller, true)?.render(Some(&options))?;
    print_diagram(&with_ports);

    let without_ports = context_of(&model, controller, false)?.render(Some(&options))?;
    print_diagram(&without_ports);

    Ok(())
}
