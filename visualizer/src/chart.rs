//! Fixed-bounds line charts drawn on an iced canvas.

use clutchcore::trace::AxisBounds;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Size, Theme,
};

const GRID_COLUMNS: usize = 10;
const GRID_ROWS: usize = 5;

pub const RAW_COLOR: Color = Color::from_rgb(0.85, 0.85, 0.85);
pub const MODEL_COLOR: Color = Color::from_rgb(0.18, 0.72, 0.89);
pub const MARKER_COLOR: Color = Color::from_rgb(0.95, 0.55, 0.2);

#[derive(Debug, Clone)]
pub struct Series {
    pub points: Vec<(f64, f64)>,
    pub color: Color,
    pub markers: bool,
}

impl Series {
    pub fn line(xs: &[i64], ys: &[f64], color: Color) -> Self {
        Self {
            points: xs.iter().zip(ys).map(|(&x, &y)| (x as f64, y)).collect(),
            color,
            markers: false,
        }
    }
}

/// One figure: a grid, fixed x/y bounds and any number of series.
#[derive(Debug, Clone)]
pub struct Chart {
    pub series: Vec<Series>,
    pub x_bounds: AxisBounds,
    pub y_bounds: AxisBounds,
}

impl Chart {
    pub fn new(x_bounds: AxisBounds, y_bounds: AxisBounds) -> Self {
        Self {
            series: Vec::new(),
            x_bounds,
            y_bounds,
        }
    }

    pub fn push(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    fn project(&self, size: Size, (x, y): (f64, f64)) -> Point {
        let nx = self.x_bounds.normalize(x).clamp(0.0, 1.0) as f32;
        let ny = self.y_bounds.normalize(y).clamp(0.0, 1.0) as f32;
        Point::new(nx * size.width, size.height - ny * size.height)
    }
}

impl<Message> canvas::Program<Message> for Chart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let size = bounds.size();
        frame.fill_rectangle(Point::ORIGIN, size, Color::from_rgb(0.05, 0.05, 0.05));

        let grid = Path::new(|builder| {
            for col in 0..=GRID_COLUMNS {
                let x = size.width * col as f32 / GRID_COLUMNS as f32;
                builder.move_to(Point::new(x, 0.0));
                builder.line_to(Point::new(x, size.height));
            }
            for row in 0..=GRID_ROWS {
                let y = size.height * row as f32 / GRID_ROWS as f32;
                builder.move_to(Point::new(0.0, y));
                builder.line_to(Point::new(size.width, y));
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_color(Color::from_rgb(0.25, 0.25, 0.3))
                .with_width(1.0),
        );

        for series in &self.series {
            if series.points.len() > 1 {
                let path = Path::new(|builder| {
                    for (i, &point) in series.points.iter().enumerate() {
                        let projected = self.project(size, point);
                        if i == 0 {
                            builder.move_to(projected);
                        } else {
                            builder.line_to(projected);
                        }
                    }
                });
                frame.stroke(
                    &path,
                    Stroke::default().with_width(2.0).with_color(series.color),
                );
            }

            if series.markers {
                for &point in &series.points {
                    let marker =
                        Path::new(|builder| builder.circle(self.project(size, point), 4.0));
                    frame.fill(&marker, MARKER_COLOR);
                }
            }
        }

        vec![frame.into_geometry()]
    }
}
