use actix_multipart::Multipart;
use actix_web::error::InternalError;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest, HttpResponse, Responder, ResponseError};

use crate::state::AppState;
use crate::voucher::models::{
    FilterQuery, PingResponse, SubmitResponse, SuggestionsResponse, VoucherForm,
    VoucherNoResponse,
};
use crate::voucher::form_parser;
use crate::voucher::submission::{submit_voucher, SubmissionError};
use crate::voucher::suggestions;
use crate::ErrorResponse;

const INVALID_FILTER: &str = "Invalid filter option";
/// Signature data URLs make submit bodies far larger than actix's default.
const SUBMIT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[utoipa::path(
    tag = "Voucher Service",
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Server is up", body = PingResponse)
    )
)]
pub async fn ping() -> impl Responder {
    HttpResponse::Ok().json(PingResponse {
        message: "Server is active".to_string(),
    })
}

#[utoipa::path(
    tag = "Voucher Service",
    get,
    path = "/get-voucher-no",
    params(FilterQuery),
    responses(
        (status = 200, description = "Next voucher number for the category", body = VoucherNoResponse),
        (status = 400, description = "Unknown category", body = ErrorResponse)
    )
)]
pub async fn get_voucher_no(
    query: web::Query<FilterQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    let filter = query.into_inner().filter.unwrap_or_default();
    log::info!("GET /get-voucher-no filter={}", filter);

    let Some(settings) = state.categories.resolve(&filter) else {
        return HttpResponse::BadRequest().json(ErrorResponse::new(INVALID_FILTER));
    };

    let voucher_no = state
        .allocator
        .next_voucher_no(state.sheets.as_ref(), settings)
        .await;
    HttpResponse::Ok().json(VoucherNoResponse { voucher_no })
}

#[utoipa::path(
    tag = "Voucher Service",
    get,
    path = "/get-suggestions",
    params(FilterQuery),
    responses(
        (status = 200, description = "Distinct payees already recorded", body = SuggestionsResponse),
        (status = 400, description = "Unknown category", body = ErrorResponse),
        (status = 500, description = "Spreadsheet read failed", body = ErrorResponse)
    )
)]
pub async fn get_suggestions(
    query: web::Query<FilterQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    let filter = query.into_inner().filter.unwrap_or_default();
    log::info!("GET /get-suggestions filter={}", filter);

    let Some(settings) = state.categories.resolve(&filter) else {
        return HttpResponse::BadRequest().json(ErrorResponse::new(INVALID_FILTER));
    };

    match suggestions::pay_to_suggestions(state.sheets.as_ref(), settings).await {
        Ok(pay_to_suggestions) => {
            HttpResponse::Ok().json(SuggestionsResponse { pay_to_suggestions })
        }
        Err(e) => {
            log::error!("Failed to fetch suggestions for {}: {}", settings.category, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to fetch suggestions"))
        }
    }
}

#[utoipa::path(
    tag = "Voucher Service",
    post,
    path = "/submit",
    request_body(
        content = VoucherForm,
        content_type = "multipart/form-data",
        description = "Text fields only. The same fields are accepted as `application/x-www-form-urlencoded` or `application/json`."
    ),
    responses(
        (status = 200, description = "Voucher recorded", body = SubmitResponse),
        (status = 400, description = "Unknown category or malformed body", body = ErrorResponse),
        (status = 413, description = "Body too large", body = ErrorResponse),
        (status = 415, description = "Unsupported content type", body = ErrorResponse),
        (status = 500, description = "A submission stage failed", body = ErrorResponse)
    )
)]
pub async fn submit(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> impl Responder {
    let form = match read_voucher_form(&req, payload).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    log::info!(
        "POST /submit filter={} voucherNo={}",
        form.filter,
        form.voucher_no
    );

    match submit_voucher(&state, form).await {
        Ok(outcome) => {
            log::info!("Voucher {} recorded", outcome.voucher_no);
            HttpResponse::Ok().json(SubmitResponse {
                message: "Data submitted successfully and PDF uploaded!".to_string(),
                sheet_url: outcome.sheet_url,
                pdf_file_id: outcome.pdf_file_id,
            })
        }
        Err(e) => error_response(&e),
    }
}

/// Pick the body parser from the request content type.
async fn read_voucher_form(
    req: &HttpRequest,
    payload: web::Payload,
) -> Result<VoucherForm, HttpResponse> {
    let mut payload = payload.into_inner();
    let content_type = req.content_type().to_ascii_lowercase();

    if content_type == "multipart/form-data" {
        let multipart = Multipart::new(req.headers(), payload);
        form_parser::parse_voucher_multipart(multipart, SUBMIT_BODY_LIMIT)
            .await
            .map_err(|e| {
                log::warn!("Rejected multipart submission: {}", e);
                HttpResponse::build(e.status_code()).json(ErrorResponse::new(&e.to_string()))
            })
    } else if content_type == "application/json" || content_type.ends_with("+json") {
        web::Json::<VoucherForm>::from_request(req, &mut payload)
            .await
            .map(web::Json::into_inner)
            .map_err(|e| e.error_response())
    } else {
        web::Form::<VoucherForm>::from_request(req, &mut payload)
            .await
            .map(web::Form::into_inner)
            .map_err(|e| e.error_response())
    }
}

/// Keep the extractor's status but answer with an `ErrorResponse` body.
fn body_error<E>(err: E) -> actix_web::Error
where
    E: ResponseError + 'static,
{
    log::warn!("Rejected submission body: {}", err);
    let response = HttpResponse::build(err.status_code()).json(ErrorResponse::new(&err.to_string()));
    InternalError::from_response(err, response).into()
}

fn error_response(error: &SubmissionError) -> HttpResponse {
    match error {
        SubmissionError::InvalidCategory(_) => log::warn!("Rejected submission: {}", error),
        _ => log::error!("Submission failed: {}", error),
    }
    HttpResponse::build(error.status_code()).json(ErrorResponse::new(error.public_message()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .limit(SUBMIT_BODY_LIMIT)
            .error_handler(|err, _| body_error(err)),
    )
    .app_data(
        web::JsonConfig::default()
            .limit(SUBMIT_BODY_LIMIT)
            .error_handler(|err, _| body_error(err)),
    )
        .route("/ping", web::get().to(ping))
        .route("/get-voucher-no", web::get().to(get_voucher_no))
        .route("/get-suggestions", web::get().to(get_suggestions))
        .route("/submit", web::post().to(submit));
}
