mod interaction;
mod session;
mod view;

pub(in crate::app) use view::PainterMeasure;
