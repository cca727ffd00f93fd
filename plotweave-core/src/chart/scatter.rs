//! Scatter plot over a keyed point dataset.

use crate::animation::Stage;
use crate::config::ChartConfig;
use crate::error::{Error, Result};
use crate::join::{Datum, Glyph, ReconcileReport, Reconciler, RenderArgs, NODE_CLASS};
use crate::scale::{extend_domain_by_factor, extent, LinearScale, Scale};
use crate::scene::{AttrValue, NodeId};

/// Tween slot used for axis geometry.
pub const AXIS_SLOT: &str = "axis";

/// A mounted scatter plot.
///
/// The element tree under the container is:
///
/// ```text
/// svg.plotSvg
/// └── g.plotGroup        (translated by the left/top margins)
///     ├── g.xAxis
///     ├── g.yAxis
///     └── g.layer-<id>   (one g.point per datum)
/// ```
#[derive(Debug)]
pub struct ScatterPlot<K> {
    config: ChartConfig,
    svg: NodeId,
    x_axis: NodeId,
    y_axis: NodeId,
    x_scale: LinearScale,
    y_scale: LinearScale,
    reconciler: Reconciler<K>,
}

impl<K> ScatterPlot<K>
where
    K: Clone + Eq + std::hash::Hash + std::fmt::Debug,
{
    /// Mount under the element matching `selector`.
    ///
    /// A missing element is logged and yields `None`; the rest of the page
    /// keeps working without this plot.
    pub fn mount(stage: &mut Stage, selector: &str, config: ChartConfig) -> Option<Self> {
        match Self::try_mount(stage, selector, config) {
            Ok(plot) => Some(plot),
            Err(err) => {
                tracing::warn!(selector, %err, "No element found. Skipping this plot.");
                None
            }
        }
    }

    /// Mount under the element matching `selector`, failing if it is absent.
    ///
    /// Mounting twice into the same container reuses its element tree. Marks
    /// left in the layer by an earlier mount are detached, since the new
    /// plot starts with an empty scene.
    pub fn try_mount(stage: &mut Stage, selector: &str, config: ChartConfig) -> Result<Self> {
        let missing = || Error::MissingElement(selector.to_owned());
        let container = stage.surface().select(selector).ok_or_else(missing)?;

        let surface = stage.surface_mut();
        let (svg, _) = surface
            .select_enter(container, "plotSvg", "svg")
            .ok_or_else(missing)?;
        surface.set_attr(svg, "width", config.width);
        surface.set_attr(svg, "height", config.height);

        let (group, _) = surface.select_enter(svg, "plotGroup", "g").ok_or_else(missing)?;
        let sides = config.margin.sides();
        surface.set_attr(group, "translate", AttrValue::point(sides.left, sides.top));

        let (x_axis, _) = surface.select_enter(group, "xAxis", "g").ok_or_else(missing)?;
        let (y_axis, _) = surface.select_enter(group, "yAxis", "g").ok_or_else(missing)?;
        let layer_class = format!("layer-{}", config.layer);
        let (layer, _) = surface
            .select_enter(group, &layer_class, "g")
            .ok_or_else(missing)?;

        let stale = surface.select_all(layer, NODE_CLASS);
        for node in &stale {
            stage.detach(*node);
        }

        tracing::debug!(selector, %layer, stale = stale.len(), "mounted scatter plot");
        Ok(Self {
            config,
            svg,
            x_axis,
            y_axis,
            x_scale: LinearScale::new(),
            y_scale: LinearScale::new(),
            reconciler: Reconciler::new(layer),
        })
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Mutable configuration. Changes apply on the next render.
    pub fn config_mut(&mut self) -> &mut ChartConfig {
        &mut self.config
    }

    pub fn svg(&self) -> NodeId {
        self.svg
    }

    pub fn layer(&self) -> NodeId {
        self.reconciler.layer()
    }

    pub fn x_scale(&self) -> &LinearScale {
        &self.x_scale
    }

    pub fn y_scale(&self) -> &LinearScale {
        &self.y_scale
    }

    pub fn reconciler(&self) -> &Reconciler<K> {
        &self.reconciler
    }

    /// Rescale to `dataset`, move the axes and reconcile the marks.
    pub fn render<D, G>(
        &mut self,
        stage: &mut Stage,
        dataset: &[D],
        glyph: &G,
    ) -> ReconcileReport<K>
    where
        D: Datum<Key = K>,
        G: Glyph<D> + ?Sized,
    {
        self.update_scales(dataset);
        self.update_axes(stage);

        let args = RenderArgs::new(&self.x_scale, &self.y_scale, self.config.durations);
        self.reconciler.reconcile(stage, dataset, glyph, &args)
    }

    /// Remove every mark.
    pub fn clear<D, G>(&mut self, stage: &mut Stage, glyph: &G) -> ReconcileReport<K>
    where
        D: Datum<Key = K>,
        G: Glyph<D> + ?Sized,
    {
        let args = RenderArgs::new(&self.x_scale, &self.y_scale, self.config.durations);
        self.reconciler.clear::<D, G>(stage, glyph, &args)
    }

    fn update_scales<D: Datum>(&mut self, dataset: &[D]) {
        let config = &self.config;
        self.x_scale.set_range([0.0, config.inner_width()]);
        self.y_scale.set_range([config.inner_height(), 0.0]);

        let x = config
            .x_domain
            .or_else(|| data_domain(dataset.iter().map(|d| d.x()), config));
        let y = config
            .y_domain
            .or_else(|| data_domain(dataset.iter().map(|d| d.y()), config));

        // An empty dataset keeps the previous domain.
        if let Some(x) = x {
            self.x_scale.set_domain(x);
            if config.x_domain.is_none() && config.nice {
                self.x_scale.nice(config.tick_count);
            }
        }
        if let Some(y) = y {
            self.y_scale.set_domain(y);
            if config.y_domain.is_none() && config.nice {
                self.y_scale.nice(config.tick_count);
            }
        }
    }

    fn update_axes(&self, stage: &mut Stage) {
        let duration = self.config.durations.update;
        let (width, height) = (self.config.inner_width(), self.config.inner_height());

        for (axis, scale, translate, extent) in [
            (self.x_axis, &self.x_scale, (0.0, height), (0.0, width)),
            (self.y_axis, &self.y_scale, (0.0, 0.0), (height, 0.0)),
        ] {
            let [d0, d1] = scale.domain();
            let ticks = scale
                .ticks(self.config.tick_count)
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(",");
            stage.surface_mut().set_attr(axis, "ticks", ticks);
            stage
                .animate(axis, AXIS_SLOT, duration)
                .attr("translate", translate)
                .attr("extent", extent)
                .attr("domain", (d0, d1))
                .start();
        }
    }
}

fn data_domain<I: IntoIterator<Item = f64>>(values: I, config: &ChartConfig) -> Option<[f64; 2]> {
    extent(values).map(|raw| extend_domain_by_factor(raw, config.domain_extend_factor))
}
