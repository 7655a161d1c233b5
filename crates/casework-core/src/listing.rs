//! Plain listings for case studies and blog posts.
//!
//! Unlike [`crate::query`], these never rank; they filter the published set
//! and slice a page out of it, preserving store order (newest first).

use anyhow::Result;
use serde::Serialize;

use crate::models::{eq_ignore_case, BlogPost, CaseStudy};
use crate::store::ContentStore;

/// Parameters for `GET /api/case-studies`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseStudyListParams {
    /// Case-insensitive exact industry match.
    pub industry: Option<String>,
    pub featured_only: bool,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyList {
    pub case_studies: Vec<CaseStudy>,
    pub total: usize,
}

pub async fn list_case_studies<S: ContentStore + ?Sized>(
    store: &S,
    params: &CaseStudyListParams,
) -> Result<CaseStudyList> {
    let filtered: Vec<CaseStudy> = store
        .published_case_studies()
        .await?
        .into_iter()
        .filter(|s| !params.featured_only || s.featured)
        .filter(|s| match &params.industry {
            Some(ind) => eq_ignore_case(&s.industry, ind),
            None => true,
        })
        .collect();

    let total = filtered.len();
    let case_studies = filtered
        .into_iter()
        .skip(params.offset)
        .take(params.limit)
        .collect();

    Ok(CaseStudyList {
        case_studies,
        total,
    })
}

/// Parameters for `GET /api/blog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogListParams {
    pub category: Option<String>,
    pub tag: Option<String>,
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

impl Default for BlogListParams {
    fn default() -> Self {
        Self {
            category: None,
            tag: None,
            page: 1,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPage {
    pub posts: Vec<BlogPost>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

pub async fn list_blog_posts<S: ContentStore + ?Sized>(
    store: &S,
    params: &BlogListParams,
) -> Result<BlogPage> {
    let page = params.page.max(1);
    let limit = params.limit.max(1);

    let filtered: Vec<BlogPost> = store
        .published_blog_posts()
        .await?
        .into_iter()
        .filter(|p| match &params.category {
            Some(c) => eq_ignore_case(&p.category, c),
            None => true,
        })
        .filter(|p| match &params.tag {
            Some(t) => p.tags.iter().any(|pt| eq_ignore_case(pt, t)),
            None => true,
        })
        .collect();

    let total = filtered.len();
    let posts = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    Ok(BlogPage {
        posts,
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
    })
}
