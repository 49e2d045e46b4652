use super::*;
use crate::clock::ManualClock;
use crate::message::{ExecutionType, Message, Payload};
use std::time::Duration;

mod common;
use common::*;

mod push;
