use crate::RawMessage;
use log::{debug, error, info, trace, warn};
use std::fmt::Debug;

#[derive(Debug)]
enum Event<'a> {
    Input(&'a dyn Debug, u128, &'a [u8]),
    Output(&'a dyn Debug, &'a [u8]),
    Error(&'a dyn Debug, &'a dyn Debug),
    Warning(&'a dyn Debug, &'a dyn Debug),
    Info(&'a dyn Debug, &'a dyn Debug),
}

pub(crate) struct EventLog {}

impl EventLog {
    pub fn input(name: &dyn Debug, msg: &RawMessage) {
        let event = Event::Input(&name, msg.uuid.as_u128(), &msg.data);
        if log::log_enabled!(log::Level::Trace) {
            trace!("{:02X?}", event);
        } else {
            debug!("{:?} message {} len:{}", name, msg.uuid, msg.data.len());
        }
    }

    pub fn output(name: &dyn Debug, data: &[u8]) {
        let event = Event::Output(&name, data);
        trace!("{:02X?}", event);
    }

    pub fn warning(name: &dyn Debug, warn: &dyn Debug) {
        let event = Event::Warning(&name, warn);
        warn!("{:?}", event);
    }

    pub fn error(name: &dyn Debug, err: &dyn Debug) {
        let event = Event::Error(&name, err);
        error!("{:?}", event);
    }

    pub fn info(name: &dyn Debug, msg: &dyn Debug) {
        let event = Event::Info(&name, msg);
        info!("{:?}", event);
    }
}
