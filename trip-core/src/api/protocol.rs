//! Typed requests for the trip server's REST API.
//!
//! Each request type knows its method, path and body, and names the type the
//! server answers with, so `Api::call` can stay generic.

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::api::wire::{RawOfferGroup, RawPoint, RawSyncResponse};
use crate::error::TripResult;
use crate::event::Destination;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn method(&self) -> Method;

    /// Path relative to the configured end point, without a leading slash.
    fn path(&self) -> String;

    fn body(&self) -> TripResult<Option<serde_json::Value>> {
        Ok(None)
    }
}

pub struct GetPoints;

impl ApiRequest for GetPoints {
    type Response = Vec<RawPoint>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        "points".into()
    }
}

pub struct GetDestinations;

impl ApiRequest for GetDestinations {
    type Response = Vec<Destination>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        "destinations".into()
    }
}

pub struct GetOffers;

impl ApiRequest for GetOffers {
    type Response = Vec<RawOfferGroup>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        "offers".into()
    }
}

pub struct CreatePoint {
    pub point: RawPoint,
}

impl ApiRequest for CreatePoint {
    type Response = RawPoint;

    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        "points".into()
    }

    fn body(&self) -> TripResult<Option<serde_json::Value>> {
        Ok(Some(serde_json::to_value(&self.point)?))
    }
}

pub struct UpdatePoint {
    pub point: RawPoint,
}

impl ApiRequest for UpdatePoint {
    type Response = RawPoint;

    fn method(&self) -> Method {
        Method::PUT
    }

    fn path(&self) -> String {
        format!("points/{}", self.point.id)
    }

    fn body(&self) -> TripResult<Option<serde_json::Value>> {
        Ok(Some(serde_json::to_value(&self.point)?))
    }
}

pub struct DeletePoint {
    pub id: String,
}

impl ApiRequest for DeletePoint {
    // The server answers with an empty body
    type Response = ();

    fn method(&self) -> Method {
        Method::DELETE
    }

    fn path(&self) -> String {
        format!("points/{}", self.id)
    }
}

pub struct SyncPoints {
    pub points: Vec<RawPoint>,
}

impl ApiRequest for SyncPoints {
    type Response = RawSyncResponse;

    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        "points/sync".into()
    }

    fn body(&self) -> TripResult<Option<serde_json::Value>> {
        Ok(Some(serde_json::to_value(&self.points)?))
    }
}
